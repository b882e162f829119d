//! Machine-check architecture records.

use ia32_macro::bitstruct;

use super::{IA32_MCG_CAP, IA32_MCG_STATUS, msr_value};

bitstruct! {
	/// `IA32_MCG_CAP`: machine-check global capabilities.
	pub struct McgCap(u64) {
		/// Number of error-reporting banks.
		pub count[7:0] => as u8,
		/// `IA32_MCG_CTL` is present.
		pub mcg_ctl_p[8] => as bool,
		/// Extended machine-check state registers are present.
		pub mcg_ext_p[9] => as bool,
		/// Corrected machine-check interrupts (CMCI).
		pub mcp_cmci_p[10] => as bool,
		/// Threshold-based error status.
		pub mcg_tes_p[11] => as bool,
		/// Number of extended machine-check state registers.
		pub mcg_ext_cnt[23:16] => as u8,
		/// Software error recovery.
		pub mcg_ser_p[24] => as bool,
		/// Enhanced machine-check capability (firmware first).
		pub mcg_emc_p[25] => as bool,
		/// Extended error logging.
		pub mcg_elog_p[26] => as bool,
		/// Local machine-check exceptions.
		pub mcg_lmce_p[27] => as bool,
	}
}

bitstruct! {
	/// `IA32_MCG_STATUS`: machine-check global status.
	pub struct McgStatus(u64) {
		/// Restart IP valid.
		pub ripv[0] => as bool,
		/// Error IP valid.
		pub eipv[1] => as bool,
		/// Machine check in progress.
		pub mcip[2] => as bool,
		/// Local machine-check exception signaled.
		pub lmce_s[3] => as bool,
	}
}

bitstruct! {
	/// `IA32_MCi_STATUS`: an error-reporting bank's status.
	pub struct McStatus(u64) {
		/// Architecturally defined error code.
		pub mca_error_code[15:0] => as u16,
		/// Model-specific error code.
		pub model_specific_error_code[31:16] => as u16,
		/// Corrected error count (with CMCI).
		pub corrected_error_count[52:38] => as u16,
		/// Threshold-based error status (with `MCG_TES_P`).
		pub threshold_status[54:53] => as u8,
		/// Action required (with `MCG_SER_P`).
		pub ar[55] => as bool,
		/// Signaling (with `MCG_SER_P`).
		pub s[56] => as bool,
		/// Processor context corrupt.
		pub pcc[57] => as bool,
		/// `IA32_MCi_ADDR` is valid.
		pub addrv[58] => as bool,
		/// `IA32_MCi_MISC` is valid.
		pub miscv[59] => as bool,
		/// Error reporting is enabled in `IA32_MCi_CTL`.
		pub en[60] => as bool,
		/// The error was not corrected.
		pub uc[61] => as bool,
		/// An error occurred while the bank held a valid error.
		pub over[62] => as bool,
		/// The register holds valid information.
		pub val[63] => as bool,
	}
}

bitstruct! {
	/// `IA32_MCi_CTL2`: CMCI control for a bank.
	pub struct McCtl2(u64) {
		/// Corrected error count threshold.
		pub threshold[14:0] => as u16,
		/// CMCI enable.
		pub cmci_en[30] => as bool,
	}
}

msr_value! {
	McgCap = IA32_MCG_CAP,
	McgStatus = IA32_MCG_STATUS,
	McStatus,
	McCtl2,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uncorrected_error() {
		let status = McStatus::from_bits(0xBE00_0000_0080_0400);
		assert!(status.val());
		assert!(!status.over());
		assert!(status.uc());
		assert!(status.en());
		assert!(status.miscv());
		assert!(status.addrv());
		assert!(status.pcc());
		assert_eq!(status.model_specific_error_code(), 0x0080);
		assert_eq!(status.mca_error_code(), 0x0400);
	}
}
