#![cfg_attr(
	not(doc),
	expect(missing_docs, reason = "docs are enabled only under `doc` cfg")
)]
#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![cfg_attr(not(test), no_std)]
#![cfg_attr(doc, feature(doc_cfg))]

/// A block that should result in an effect being emitted is starting.
pub const EFFECT_START: u64 = 0x1;
/// A block that should result in an effect being emitted is ending.
pub const EFFECT_END: u64 = 0x2;

/// The effect block will write to the CR0 control register.
pub const EFFECT_WRITE_REG_CR0: u64 = 0x100;
/// The effect block will write to the CR3 control register.
pub const EFFECT_WRITE_REG_CR3: u64 = 0x101;
/// The effect block will write to the CR4 control register.
pub const EFFECT_WRITE_REG_CR4: u64 = 0x102;
/// The effect block will write to the CR8 (task priority) register.
pub const EFFECT_WRITE_REG_CR8: u64 = 0x103;
/// The effect block will write to the DR7 debug control register.
pub const EFFECT_WRITE_REG_DR7: u64 = 0x104;
/// The effect block will write to XCR0 via `XSETBV`.
pub const EFFECT_WRITE_REG_XCR0: u64 = 0x105;
/// The effect block will write to RFLAGS.
pub const EFFECT_WRITE_REG_RFLAGS: u64 = 0x106;

/// The effect block will write a model-specific register.
pub const EFFECT_WRITE_MSR: u64 = 0x200;
/// The effect block will invalidate linear-address TLB entries.
pub const EFFECT_INVALIDATE_TLB: u64 = 0x201;
/// The effect block will invalidate EPT-derived mappings (`INVEPT`).
pub const EFFECT_INVALIDATE_EPT: u64 = 0x202;
/// The effect block will invalidate VPID-tagged mappings (`INVVPID`).
pub const EFFECT_INVALIDATE_VPID: u64 = 0x203;
/// The effect block will load a descriptor table register (GDTR, IDTR, LDTR or TR).
pub const EFFECT_LOAD_DESCRIPTOR_TABLE: u64 = 0x204;
/// The effect block will load a segment register or segment base.
pub const EFFECT_LOAD_SEGMENT: u64 = 0x205;
/// The effect block will write back and/or invalidate caches.
pub const EFFECT_CACHE_WRITEBACK: u64 = 0x206;
/// The effect block will perform port I/O.
pub const EFFECT_PORT_IO: u64 = 0x207;
/// The effect block will change VMX operation or the current VMCS.
pub const EFFECT_VMX_STATE: u64 = 0x208;
