/// Places a NUL-terminated string in the `.ia32_test_strings`
/// section and evaluates to its address.
#[macro_export]
macro_rules! dbgstr {
	($($tt:tt)+) => {{
		const DBG_STR: &str = concat!($($tt)+, "\0");
		const DBG_LEN: usize = DBG_STR.len();

		const fn str_to_array<const N: usize>(s: &str) -> [u8; N] {
			let mut arr = [0u8; N];
			let bytes = s.as_bytes();
			let mut i = 0usize;
			while i < N {
				arr[i] = bytes[i];
				i += 1;
			}
			arr
		}

		#[unsafe(link_section = ".ia32_test_strings")]
		#[used]
		static DBG_BYTES: [u8; DBG_LEN] = str_to_array(DBG_STR);

		(&raw const DBG_BYTES).addr()
	}};
}

/// Writes eight words to the emission window. `r0` is written last
/// and triggers the event.
#[macro_export]
#[cfg(feature = "mmio")]
macro_rules! emit_raw {
	($r0:expr, $r1:expr, $r2:expr, $r3:expr, $r4:expr, $r5:expr, $r6:expr, $r7:expr $(,)?) => {
		// SAFETY: Only compiled with the `mmio` feature, under which the
		// SAFETY: embedder has mapped the window via `set_mmio_base`.
		unsafe {
			let regs = &mut *(($crate::get_mmio_base() + 0xFEB0_0000) as *mut [u64; 8]);

			::core::ptr::write_volatile(&mut regs[7], $r7 as u64);
			::core::ptr::write_volatile(&mut regs[6], $r6 as u64);
			::core::ptr::write_volatile(&mut regs[5], $r5 as u64);
			::core::ptr::write_volatile(&mut regs[4], $r4 as u64);
			::core::ptr::write_volatile(&mut regs[3], $r3 as u64);
			::core::ptr::write_volatile(&mut regs[2], $r2 as u64);
			::core::ptr::write_volatile(&mut regs[1], $r1 as u64);
			::core::sync::atomic::compiler_fence(::core::sync::atomic::Ordering::SeqCst);
			::core::ptr::write_volatile(&mut regs[0], $r0 as u64);
			::core::sync::atomic::compiler_fence(::core::sync::atomic::Ordering::SeqCst);
		}
	};
}

/// Emits an event with up to seven payload words.
#[macro_export]
#[cfg(feature = "emit")]
macro_rules! emit {
	($id:expr, $r1:expr, $r2:expr, $r3:expr, $r4:expr, $r5:expr, $r6:expr, $r7:expr $(,)?) => {{
		const _: () = const {
			assert!(
				($id & 0xFFFF_0000_0000_0000) == 0,
				"ia32-test event ID cannot have high 16 bits set"
			);
		};
		$crate::emit_raw!($id, $r1, $r2, $r3, $r4, $r5, $r6, $r7);
	}};
	($id:expr, $r1:expr, $r2:expr $(,)?) => {
		$crate::emit!($id, $r1, $r2, 0, 0, 0, 0, 0)
	};
	($id:expr, $r1:expr $(,)?) => {
		$crate::emit!($id, $r1, 0, 0, 0, 0, 0, 0)
	};
	($id:expr $(,)?) => {
		$crate::emit!($id, 0, 0, 0, 0, 0, 0, 0)
	};
}

/// Emits an event with up to seven payload words.
#[macro_export]
#[cfg(not(feature = "emit"))]
macro_rules! emit {
	($($tt:tt)*) => {};
}

/// Maps an effect annotation to its event ID and emits it.
#[macro_export]
#[cfg(feature = "emit")]
macro_rules! emit_effect {
	( $id:expr, $loc:expr, write_reg = cr0 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_CR0);
	};
	( $id:expr, $loc:expr, write_reg = cr3 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_CR3);
	};
	( $id:expr, $loc:expr, write_reg = cr4 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_CR4);
	};
	( $id:expr, $loc:expr, write_reg = cr8 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_CR8);
	};
	( $id:expr, $loc:expr, write_reg = dr7 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_DR7);
	};
	( $id:expr, $loc:expr, write_reg = xcr0 ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_XCR0);
	};
	( $id:expr, $loc:expr, write_reg = rflags ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_REG_RFLAGS);
	};
	( $id:expr, $loc:expr, write_msr ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_WRITE_MSR);
	};
	( $id:expr, $loc:expr, invalidate_tlb ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_INVALIDATE_TLB);
	};
	( $id:expr, $loc:expr, invalidate_ept ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_INVALIDATE_EPT);
	};
	( $id:expr, $loc:expr, invalidate_vpid ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_INVALIDATE_VPID);
	};
	( $id:expr, $loc:expr, load_descriptor_table ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_LOAD_DESCRIPTOR_TABLE);
	};
	( $id:expr, $loc:expr, load_segment ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_LOAD_SEGMENT);
	};
	( $id:expr, $loc:expr, cache_writeback ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_CACHE_WRITEBACK);
	};
	( $id:expr, $loc:expr, port_io ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_PORT_IO);
	};
	( $id:expr, $loc:expr, vmx_state ) => {
		$crate::emit!($id, $loc, $crate::consts::EFFECT_VMX_STATE);
	};
	( $( $tt:tt )+ ) => {
		compile_error!(concat!("unknown effect annotation: ",  $( stringify!($tt) ),+ ))
	};
}

/// Expands the start/end annotations generated by `#[effect(...)]`.
#[macro_export]
#[cfg(feature = "emit")]
macro_rules! annotate_effect_fn {
	( start @ $fn_name:literal => { $($tt:tt)* } ) => {{
		$crate::emit_effect!(
			$crate::consts::EFFECT_START,
			$crate::dbgstr!(::core::file!(), ":", ::core::line!(), ": ", ::core::module_path!(), "::", $fn_name),
			$($tt)*
		);
	}};

	( end @ $fn_name:literal => { $($tt:tt)* } ) => {{
		$crate::emit_effect!(
			$crate::consts::EFFECT_END,
			$crate::dbgstr!(::core::file!(), ":", ::core::line!(), ": ", ::core::module_path!(), "::", $fn_name),
			$($tt)*
		);
	}};
}

/// Expands the start/end annotations generated by `#[effect(...)]`.
#[macro_export]
#[cfg(not(feature = "emit"))]
macro_rules! annotate_effect_fn {
	($($tt:tt)*) => {};
}
