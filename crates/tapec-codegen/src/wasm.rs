//! WASM backend: emits the program as a WebAssembly module.
//!
//! The instruction stream is the body of the exported `execute` function.
//! WASM has structured control flow only, so the loop markers become a
//! guarded `if` around a `loop` whose last instruction is the back edge:
//!
//! ```text
//! [ body ]  ⇒  cell > 0 ; if ; loop
//!                  <body>
//!                  cell > 0 ; br_if 0     ;; back to body
//!              end ; end
//! ```
//!
//! The `if` plays the role of the entry jump to the guard: the body is
//! skipped when the first check fails and re-entered while the check holds.
//!
//! Module assembly order:
//! 1. Type, import and function sections
//! 2. Memory, global and export sections
//! 3. Code section (`init`, `execute`)
//! 4. `name` and `tapec` custom sections
//! 5. Validation with `wasmparser`

use std::borrow::Cow;

use tapec_types::{BoundsPolicy, MEMORY_SIZE, TAPE_LEN, TAPE_OFFSET};
use wasm_encoder::{
    BlockType, CodeSection, ConstExpr, CustomSection, EntityType, ExportKind, ExportSection,
    Function, FunctionSection, GlobalSection, GlobalType, ImportSection, Instruction, MemArg,
    MemorySection, MemoryType, Module, NameMap, NameSection, TypeSection, ValType,
};

use crate::emitter::{LoopLabels, TargetEmitter};
use crate::error::{CodegenError, CodegenResult};
use crate::metadata::{UnitInfo, UnitMetadata};
use crate::types::*;

/// Label handle. Only used to check that loops close in nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasmLabel(u32);

/// Builds the WASM module for one unit.
pub struct WasmEmitter {
    /// Body of `execute`, without its final `end`.
    body: Function,
    bounds: BoundsPolicy,
    next_label: u32,
    /// Body labels of the loops currently open.
    open_loops: Vec<WasmLabel>,
    /// Set when a back edge did not match the innermost open loop.
    mismatch: Option<String>,
}

impl WasmEmitter {
    pub fn new(bounds: BoundsPolicy) -> Self {
        let mut body = Function::new(vec![(1, ValType::I32)]);
        body.instruction(&Instruction::Call(FUNC_INIT));
        Self {
            body,
            bounds,
            next_label: 0,
            open_loops: Vec::new(),
            mismatch: None,
        }
    }

    /// Push the address of `tape[pointer]`, trapping first under
    /// [`BoundsPolicy::Checked`] if the pointer is off the tape.
    fn emit_cell_address(&mut self) {
        let f = &mut self.body;
        if self.bounds == BoundsPolicy::Checked {
            // Unsigned compare also catches negative pointers.
            f.instruction(&Instruction::GlobalGet(GLOBAL_POINTER));
            f.instruction(&Instruction::I32Const(TAPE_LEN as i32));
            f.instruction(&Instruction::I32GeU);
            f.instruction(&Instruction::If(BlockType::Empty));
            f.instruction(&Instruction::Unreachable);
            f.instruction(&Instruction::End);
        }
        f.instruction(&Instruction::GlobalGet(GLOBAL_POINTER));
        f.instruction(&Instruction::I32Const(TAPE_OFFSET as i32));
        f.instruction(&Instruction::I32Add);
    }

    /// Push `tape[pointer] > 0`.
    fn emit_guard(&mut self) {
        self.emit_cell_address();
        let f = &mut self.body;
        f.instruction(&Instruction::I32Load8U(byte_memarg()));
        f.instruction(&Instruction::I32Const(0));
        f.instruction(&Instruction::I32GtU);
    }

    // ── Module sections ──────────────────────────────────────────────────

    fn emit_types() -> TypeSection {
        let mut types = TypeSection::new();
        // TYPE_VOID_VOID: () -> ()
        types.ty().function(vec![], vec![]);
        // TYPE_VOID_I32: () -> i32
        types.ty().function(vec![], vec![ValType::I32]);
        // TYPE_I32_VOID: (i32) -> ()
        types.ty().function(vec![ValType::I32], vec![]);
        types
    }

    fn emit_imports() -> ImportSection {
        let mut imports = ImportSection::new();
        // IMPORT_READ_BYTE
        imports.import(IMPORT_MODULE, "read_byte", EntityType::Function(TYPE_VOID_I32));
        // IMPORT_WRITE_BYTE
        imports.import(IMPORT_MODULE, "write_byte", EntityType::Function(TYPE_I32_VOID));
        imports
    }

    fn emit_memory() -> MemorySection {
        let mut memory = MemorySection::new();
        memory.memory(MemoryType {
            minimum: MEMORY_PAGES,
            maximum: Some(MEMORY_PAGES),
            memory64: false,
            shared: false,
            page_size_log2: None,
        });
        memory
    }

    fn emit_globals() -> GlobalSection {
        let mut globals = GlobalSection::new();
        // GLOBAL_POINTER
        globals.global(
            GlobalType {
                val_type: ValType::I32,
                mutable: true,
                shared: false,
            },
            &ConstExpr::i32_const(0),
        );
        globals
    }

    fn emit_exports() -> ExportSection {
        let mut exports = ExportSection::new();
        exports.export(EXPORT_EXECUTE, ExportKind::Func, FUNC_EXECUTE);
        exports.export(EXPORT_INIT, ExportKind::Func, FUNC_INIT);
        exports.export(EXPORT_MEMORY, ExportKind::Memory, 0);
        exports.export(EXPORT_POINTER, ExportKind::Global, GLOBAL_POINTER);
        exports
    }

    /// `init()`: zero the whole memory region and reset the pointer.
    fn emit_init() -> Function {
        let mut f = Function::new(vec![]);
        f.instruction(&Instruction::I32Const(0));
        f.instruction(&Instruction::GlobalSet(GLOBAL_POINTER));
        f.instruction(&Instruction::I32Const(0));
        f.instruction(&Instruction::I32Const(0));
        f.instruction(&Instruction::I32Const(MEMORY_SIZE as i32));
        f.instruction(&Instruction::MemoryFill(0));
        f.instruction(&Instruction::End);
        f
    }

    fn emit_names(info: &UnitInfo) -> NameSection {
        let mut names = NameSection::new();
        names.module(&info.name);

        let mut funcs = NameMap::new();
        funcs.append(IMPORT_READ_BYTE, "env.read_byte");
        funcs.append(IMPORT_WRITE_BYTE, "env.write_byte");
        funcs.append(FUNC_INIT, &info.init_name());
        funcs.append(FUNC_EXECUTE, &info.entry_name());
        names.functions(&funcs);

        let mut globals = NameMap::new();
        globals.append(GLOBAL_POINTER, "pointer");
        names.globals(&globals);
        names
    }
}

impl TargetEmitter for WasmEmitter {
    type Label = WasmLabel;
    type Output = Vec<u8>;

    fn new_label(&mut self) -> WasmLabel {
        self.next_label += 1;
        WasmLabel(self.next_label)
    }

    fn move_pointer(&mut self, delta: i16) {
        let f = &mut self.body;
        f.instruction(&Instruction::GlobalGet(GLOBAL_POINTER));
        f.instruction(&Instruction::I32Const(i32::from(delta)));
        f.instruction(&Instruction::I32Add);
        f.instruction(&Instruction::I32Extend16S);
        f.instruction(&Instruction::GlobalSet(GLOBAL_POINTER));
    }

    fn add_cell(&mut self, delta: i8) {
        self.emit_cell_address();
        let f = &mut self.body;
        f.instruction(&Instruction::LocalTee(LOCAL_ADDR));
        f.instruction(&Instruction::LocalGet(LOCAL_ADDR));
        f.instruction(&Instruction::I32Load8U(byte_memarg()));
        f.instruction(&Instruction::I32Const(i32::from(delta)));
        f.instruction(&Instruction::I32Add);
        // store8 keeps the low 8 bits: wrapping cell arithmetic.
        f.instruction(&Instruction::I32Store8(byte_memarg()));
    }

    fn write_byte(&mut self) {
        self.emit_cell_address();
        let f = &mut self.body;
        f.instruction(&Instruction::I32Load8U(byte_memarg()));
        f.instruction(&Instruction::Call(IMPORT_WRITE_BYTE));
    }

    fn read_byte(&mut self) {
        self.emit_cell_address();
        let f = &mut self.body;
        f.instruction(&Instruction::Call(IMPORT_READ_BYTE));
        f.instruction(&Instruction::I32Store8(byte_memarg()));
    }

    fn emit_loop_entry(&mut self, labels: LoopLabels<WasmLabel>) {
        self.emit_guard();
        self.body.instruction(&Instruction::If(BlockType::Empty));
        self.body.instruction(&Instruction::Loop(BlockType::Empty));
        self.open_loops.push(labels.body);
    }

    fn emit_loop_back_edge(&mut self, labels: LoopLabels<WasmLabel>) {
        match self.open_loops.pop() {
            Some(innermost) if innermost == labels.body => {}
            other => {
                self.mismatch.get_or_insert_with(|| {
                    format!("back edge for {:?} closes {other:?}", labels.body)
                });
            }
        }
        self.emit_guard();
        self.body.instruction(&Instruction::BrIf(0));
        self.body.instruction(&Instruction::End);
        self.body.instruction(&Instruction::End);
    }

    fn emit_return(&mut self) {
        self.body.instruction(&Instruction::Return);
    }

    fn finish(mut self, info: &UnitInfo) -> CodegenResult<Vec<u8>> {
        if let Some(msg) = self.mismatch {
            return Err(CodegenError::Internal(msg));
        }
        if !self.open_loops.is_empty() {
            return Err(CodegenError::Internal(format!(
                "{} loop(s) still open at finish",
                self.open_loops.len()
            )));
        }
        self.body.instruction(&Instruction::End);

        let mut module = Module::new();
        module.section(&Self::emit_types());
        module.section(&Self::emit_imports());

        let mut functions = FunctionSection::new();
        functions.function(TYPE_VOID_VOID); // FUNC_INIT
        functions.function(TYPE_VOID_VOID); // FUNC_EXECUTE
        module.section(&functions);

        module.section(&Self::emit_memory());
        module.section(&Self::emit_globals());
        module.section(&Self::emit_exports());

        let mut code = CodeSection::new();
        code.function(&Self::emit_init());
        code.function(&self.body);
        module.section(&code);

        module.section(&Self::emit_names(info));
        let metadata = UnitMetadata::new(info).to_json()?;
        module.section(&CustomSection {
            name: Cow::Borrowed(CUSTOM_SECTION_NAME),
            data: Cow::Borrowed(metadata.as_slice()),
        });

        let wasm_bytes = module.finish();

        wasmparser::validate(&wasm_bytes)
            .map_err(|e| CodegenError::ValidationFailed(format!("{e}")))?;

        Ok(wasm_bytes)
    }
}

fn byte_memarg() -> MemArg {
    MemArg {
        offset: 0,
        align: 0,
        memory_index: 0,
    }
}
