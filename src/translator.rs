//! The one-pass code translator, peephole fusion pass, and the
//! process-wide translation cache.
//!
//! A single left-to-right walk over the raw bytecode builds the
//! fixed-width instruction stream and its [`PcMap`], fusing recognized
//! opcode sequences into super-instructions along the way.

use std::collections::HashMap;
use std::sync::Mutex;

use ethereum_types::H256;
use once_cell::sync::Lazy;

use crate::instruction::{Code, Instruction};
use crate::opcode::OpCode;
use crate::pcmap::PcMap;

#[derive(Clone, Debug)]
pub struct TranslatedCode {
    pub code: Code,
    pub pc_map: PcMap,
}

/// One fusable instruction-sequence pattern. Matched
/// against consecutive *base* opcodes only (immediates are carried over
/// verbatim), longest patterns tried first so a longer match is never
/// shadowed by a prefix that also happens to match.
struct SuperPattern {
    opcode: OpCode,
    sequence: &'static [OpCode],
}

static SUPER_PATTERNS: &[SuperPattern] = &[
    SuperPattern { opcode: OpCode::SUPER_PUSH1_PUSH4_DUP3, sequence: &[OpCode::PUSH1, OpCode::PUSH4, OpCode::DUP3] },
    SuperPattern { opcode: OpCode::SUPER_PUSH1_PUSH1_PUSH1_SHL_SUB, sequence: &[OpCode::PUSH1, OpCode::PUSH1, OpCode::PUSH1, OpCode::SHL, OpCode::SUB] },
    SuperPattern { opcode: OpCode::SUPER_AND_SWAP1_POP_SWAP2_SWAP1, sequence: &[OpCode::AND, OpCode::SWAP1, OpCode::POP, OpCode::SWAP2, OpCode::SWAP1] },
    SuperPattern { opcode: OpCode::SUPER_ISZERO_PUSH2_JUMPI, sequence: &[OpCode::ISZERO, OpCode::PUSH2, OpCode::JUMPI] },
    SuperPattern { opcode: OpCode::SUPER_SWAP2_SWAP1_POP_JUMP, sequence: &[OpCode::SWAP2, OpCode::SWAP1, OpCode::POP, OpCode::JUMP] },
    SuperPattern { opcode: OpCode::SUPER_SWAP1_POP_SWAP2_SWAP1, sequence: &[OpCode::SWAP1, OpCode::POP, OpCode::SWAP2, OpCode::SWAP1] },
    SuperPattern { opcode: OpCode::SUPER_POP_SWAP2_SWAP1_POP, sequence: &[OpCode::POP, OpCode::SWAP2, OpCode::SWAP1, OpCode::POP] },
    SuperPattern { opcode: OpCode::SUPER_PUSH2_JUMP, sequence: &[OpCode::PUSH2, OpCode::JUMP] },
    SuperPattern { opcode: OpCode::SUPER_PUSH2_JUMPI, sequence: &[OpCode::PUSH2, OpCode::JUMPI] },
    SuperPattern { opcode: OpCode::SUPER_PUSH1_PUSH1, sequence: &[OpCode::PUSH1, OpCode::PUSH1] },
    SuperPattern { opcode: OpCode::SUPER_PUSH1_ADD, sequence: &[OpCode::PUSH1, OpCode::ADD] },
    SuperPattern { opcode: OpCode::SUPER_PUSH1_SHL, sequence: &[OpCode::PUSH1, OpCode::SHL] },
    SuperPattern { opcode: OpCode::SUPER_PUSH1_DUP1, sequence: &[OpCode::PUSH1, OpCode::DUP1] },
    SuperPattern { opcode: OpCode::SUPER_SWAP1_POP, sequence: &[OpCode::SWAP1, OpCode::POP] },
    SuperPattern { opcode: OpCode::SUPER_POP_JUMP, sequence: &[OpCode::POP, OpCode::JUMP] },
    SuperPattern { opcode: OpCode::SUPER_POP_POP, sequence: &[OpCode::POP, OpCode::POP] },
    SuperPattern { opcode: OpCode::SUPER_SWAP2_SWAP1, sequence: &[OpCode::SWAP2, OpCode::SWAP1] },
    SuperPattern { opcode: OpCode::SUPER_SWAP2_POP, sequence: &[OpCode::SWAP2, OpCode::POP] },
    SuperPattern { opcode: OpCode::SUPER_DUP2_MSTORE, sequence: &[OpCode::DUP2, OpCode::MSTORE] },
    SuperPattern { opcode: OpCode::SUPER_DUP2_LT, sequence: &[OpCode::DUP2, OpCode::LT] },
];

/// `additional gas` for `super_instruction_static_gas`'s table lookups,
/// since the only sub-opcodes ever fused are base (sub-256) opcodes.
pub fn super_instruction_static_gas(op: OpCode, table: &[Option<u16>; 256]) -> u64 {
    let pattern = find_pattern(op);
    pattern
        .sequence
        .iter()
        .map(|sub| table[sub.to_usize()].unwrap_or(0) as u64)
        .sum()
}

/// Number of translated slots (head + trailing `NOOP`/`DATA` padding) a
/// fused super-instruction occupies. Handlers use this to skip past the
/// padding the same way `PUSH` skips its own trailing `DATA` slots.
pub fn super_instruction_slot_count(op: OpCode) -> usize {
    let pattern = find_pattern(op);
    pattern.sequence.iter().map(|sub| op_slot_count(*sub)).sum()
}

fn find_pattern(op: OpCode) -> &'static SuperPattern {
    SUPER_PATTERNS
        .iter()
        .find(|p| p.opcode == op)
        .expect("dispatched super-instruction has a known pattern")
}

/// Number of translated instruction slots a single *base* opcode occupies:
/// `PUSH1`/`PUSH2` always fit in the head's `arg`; longer pushes spill
/// trailing bytes into `DATA` slots.
fn op_slot_count(op: OpCode) -> usize {
    if op.is_push() && op != OpCode::PUSH0 {
        1 + data_slot_count(op.push_size())
    } else {
        1
    }
}

fn data_slot_count(push_len: usize) -> usize {
    if push_len <= 2 {
        0
    } else {
        (push_len - 1) / 2
    }
}

/// Reject bytecode too large to translate safely before doing any work.
///
/// [`translate`] packs instruction indices into `u16`s (via [`PcMap`] and
/// the `arg` field of [`Instruction`]), so code at or under
/// [`crate::MAX_CODE_SIZE`] always fits; this is the only way `translate`
/// could misbehave on oversized input, and EIP-170 already bounds deployed
/// code to that size.
pub fn validate(bytecode: &[u8]) -> Result<(), crate::error::TranslateError> {
    if bytecode.len() > crate::MAX_CODE_SIZE {
        return Err(crate::error::TranslateError::CodeTooLarge {
            len: bytecode.len(),
            max: crate::MAX_CODE_SIZE,
        });
    }
    Ok(())
}

/// Translate raw EVM bytecode into the internal instruction stream.
///
/// The pass is a single left-to-right walk: `PUSH1..PUSH32` consume their
/// immediate bytes and, once their value exceeds 16 bits, spill the
/// remaining big-endian chunks into trailing `DATA` slots; trailing bytes
/// beyond the push's declared length are always zero-padded, which is why
/// the translated cursor can fall behind the original byte offset. Every
/// `JUMPDEST` re-synchronizes the two: a `JUMP_TO` bridges the gap left by
/// fallthrough execution and `NOOP` pads the rest, so `JUMPDEST` always
/// ends up at the SAME index in the translated stream as its original byte
/// offset. Every byte offset that starts a real instruction is recorded in
/// the returned [`PcMap`]; that invariant holds before AND after fusion,
/// since the peephole pass only ever replaces opcodes that can never
/// themselves be a `JUMPDEST` and leaves the window's length (and so every
/// later offset) unchanged.
///
/// Super-instructions and a populated [`PcMap`] are mutually exclusive:
/// requesting one disables the other (see [`TranslateOptions`]). This
/// entry point always requests a map; callers that want fusion go through
/// [`translate_with`] directly (see [`crate::execute`]).
pub fn translate(bytecode: &[u8], enable_super_instructions: bool) -> TranslatedCode {
    translate_with(bytecode, TranslateOptions { enable_super_instructions, build_pc_map: true })
}

/// Options controlling a single [`translate_with`] call.
#[derive(Clone, Copy, Debug)]
pub struct TranslateOptions {
    pub enable_super_instructions: bool,
    /// Request the [`PcMap`] as an authoritative, inspectable artifact of
    /// this call. Setting this disables fusion outright rather than
    /// returning a map whose offsets a caller might reasonably read as
    /// describing an unfused stream. The interpreter's own `JUMP`/`JUMPI`
    /// resolution still gets a correct map either way — [`TranslatedCode`]
    /// always carries one — this flag only governs whether fusion runs.
    pub build_pc_map: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self { enable_super_instructions: false, build_pc_map: true }
    }
}

/// Translate raw EVM bytecode under explicit [`TranslateOptions`].
///
/// When `build_pc_map` is set, `enable_super_instructions` is ignored and
/// fusion never runs — see [`TranslateOptions::build_pc_map`].
pub fn translate_with(bytecode: &[u8], options: TranslateOptions) -> TranslatedCode {
    let mut code = Vec::with_capacity(bytecode.len());
    let mut pc_map = PcMap::new(bytecode.len(), bytecode.len());
    let fuse = options.enable_super_instructions && !options.build_pc_map;

    let mut i = 0usize;
    while i < bytecode.len() {
        let byte = bytecode[i];
        let op = OpCode(byte as u16);

        if op == OpCode::JUMPDEST {
            let next = code.len();
            assert!(
                next <= i,
                "translated cursor ran ahead of the original byte offset at JUMPDEST {i}"
            );
            if next < i {
                code.push(Instruction::new(OpCode::JUMP_TO, i as u16));
            }
            while code.len() < i {
                code.push(Instruction::plain(OpCode::NOOP));
            }
            pc_map.record(i as u16, i as u16);
            code.push(Instruction::plain(OpCode::JUMPDEST));
            i += 1;
            continue;
        }

        let trans_index = code.len() as u16;
        pc_map.record(i as u16, trans_index);

        if op.is_push() && op != OpCode::PUSH0 {
            let push_len = op.push_size();
            let mut bytes = [0u8; 32];
            let available = (bytecode.len() - i - 1).min(push_len);
            bytes[32 - push_len..32 - push_len + available]
                .copy_from_slice(&bytecode[i + 1..i + 1 + available]);

            let value_bytes = &bytes[32 - push_len..];
            let head = u16::from_be_bytes([
                if push_len >= 2 { value_bytes[0] } else { 0 },
                if push_len >= 2 { value_bytes[1] } else { value_bytes[0] },
            ]);
            code.push(Instruction::new(op, head));

            let mut consumed = push_len.min(2);
            while consumed < push_len {
                let chunk = &value_bytes[consumed..(consumed + 2).min(push_len)];
                let arg = if chunk.len() == 2 {
                    u16::from_be_bytes([chunk[0], chunk[1]])
                } else {
                    u16::from_be_bytes([chunk[0], 0])
                };
                code.push(Instruction::new(OpCode::DATA, arg));
                consumed += 2;
            }

            i += 1 + push_len;
        } else {
            code.push(Instruction::plain(op));
            i += 1;
        }
    }

    pc_map.record_end(bytecode.len() as u16, code.len() as u16);

    if fuse {
        fuse_super_instructions(&mut code);
    }

    TranslatedCode { code, pc_map }
}

/// Match `pattern` against the translated stream starting at `i`. Each
/// sub-opcode may itself occupy more than one translated slot (a
/// multi-byte `PUSH`'s trailing `DATA`); returns the sub-opcode boundary
/// offsets (not the whole window length) on a match.
fn match_pattern(code: &[Instruction], i: usize, pattern: &SuperPattern) -> Option<Vec<usize>> {
    let mut offsets = Vec::with_capacity(pattern.sequence.len());
    let mut cursor = i;
    for want in pattern.sequence {
        if cursor >= code.len() || code[cursor].op() != *want {
            return None;
        }
        offsets.push(cursor);
        cursor += op_slot_count(*want);
    }
    if cursor > code.len() {
        return None;
    }
    offsets.push(cursor); // sentinel: one past the window's end.
    Some(offsets)
}

fn fuse_super_instructions(code: &mut [Instruction]) {
    let mut i = 0usize;
    'outer: while i < code.len() {
        for pattern in SUPER_PATTERNS {
            let Some(offsets) = match_pattern(code, i, pattern) else {
                continue;
            };
            let end = *offsets.last().unwrap();
            let head_arg = code[i].arg;

            // Any non-head sub-opcode that itself carries an immediate
            // (a PUSH) has its head slot repurposed as a DATA slot so the
            // value survives for the handler to reconstruct; everything
            // else collapses to NOOP. Slots that were already DATA (a
            // multi-byte push's own spillover) are left untouched.
            for (idx, &sub_start) in offsets.iter().enumerate().skip(1).take(offsets.len() - 2) {
                let sub_op = pattern.sequence[idx];
                if sub_op.is_push() && sub_op != OpCode::PUSH0 {
                    code[sub_start] = Instruction::new(OpCode::DATA, code[sub_start].arg);
                } else {
                    code[sub_start] = Instruction::plain(OpCode::NOOP);
                }
            }
            for slot in &mut code[i + 1..end] {
                if slot.op() != OpCode::DATA {
                    *slot = Instruction::plain(OpCode::NOOP);
                }
            }

            code[i] = Instruction::new(pattern.opcode, head_arg);
            i = end;
            continue 'outer;
        }
        i += 1;
    }
}

/// Process-wide translation cache: one mutex guarding the whole map,
/// keyed by code identity. Keyed code is logically
/// immutable once inserted and shared read-only thereafter; "create
/// call" code (no identity) is never inserted.
pub struct TranslationCache {
    table: Mutex<HashMap<(H256, bool), std::sync::Arc<TranslatedCode>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached translation for `(code_identity, super_instructions)`
    /// if present, otherwise translate `bytecode`, cache it, and return it.
    pub fn get_or_translate(
        &self,
        code_identity: Option<H256>,
        bytecode: &[u8],
        enable_super_instructions: bool,
    ) -> std::sync::Arc<TranslatedCode> {
        let opts = TranslateOptions { enable_super_instructions, build_pc_map: false };
        let Some(identity) = code_identity else {
            return std::sync::Arc::new(translate_with(bytecode, opts));
        };

        let key = (identity, enable_super_instructions);
        {
            let table = self.table.lock().unwrap();
            if let Some(cached) = table.get(&key) {
                return cached.clone();
            }
        }

        let translated = std::sync::Arc::new(translate_with(bytecode, opts));
        self.table.lock().unwrap().insert(key, translated.clone());
        translated
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-global cache instance: a lazily-initialized static rather
/// than a value threaded through every call site.
pub static GLOBAL_TRANSLATION_CACHE: Lazy<TranslationCache> = Lazy::new(TranslationCache::new);
