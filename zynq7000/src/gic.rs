//! # GIC (Generic Interrupt Controller) register module.
//!
//! Only the registers required to route, mask and acknowledge interrupts are typed, the rest of
//! both blocks is kept as reserved space so the layouts span the full register windows.
pub use crate::mpcore::GICC_BASE_ADDR;
use arbitrary_int::{u3, u10};
use static_assertions::const_assert_eq;

/// Distributor Control Register
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct DistributorControlRegister {
    #[bit(1, rw)]
    enable_non_secure: bool,
    #[bit(0, rw)]
    enable_secure: bool,
}

/// GIC Distributor registers.
#[derive(derive_mmio::Mmio)]
#[repr(C, align(8))]
pub struct GicDistributor {
    /// Distributor Control Register
    pub dcr: DistributorControlRegister,
    /// Interrupt Controller Type Register
    #[mmio(PureRead)]
    pub ictr: u32,
    /// Distributor Implementer Identification Register
    #[mmio(PureRead)]
    pub iidr: u32,
    _reserved_0: [u32; 0x1D],
    /// Interrupt Security Registers
    pub isr: [u32; 3],
    _reserved_1: [u32; 0x1D],
    /// Interrupt Set-Enable Registers
    pub iser: [u32; 3],
    _reserved_2: [u32; 0x1D],
    /// Interrupt Clear-Enable Registers
    pub icer: [u32; 3],
    _reserved_3: [u32; 0x1D],
    /// Interrupt Set-Pending Registers
    pub ispr: [u32; 3],
    _reserved_4: [u32; 0x1D],
    /// Interrupt Clear-Pending Registers
    pub icpr: [u32; 3],
    _reserved_5: [u32; 0x1D],
    /// Active Bit Registers
    pub abr: [u32; 3],
    _reserved_6: [u32; 0x3D],
    /// Interrupt Priority Registers, one byte per interrupt ID.
    pub ipr: [u32; 0x18],
    _reserved_7: [u32; 0xE8],
    /// Interrupt Processor Targets Registers for SGIs and PPIs. Read-only on this SoC.
    pub iptr_sgi_ppi: [u32; 0x8],
    /// Interrupt Processor Targets Registers for SPIs, one byte per interrupt ID.
    pub iptr_spi: [u32; 0x10],
    _reserved_8: [u32; 0xE8],
    /// Interrupt sensitivity register for software generated interrupts (SGI)
    pub icfr_0_sgi: u32,
    /// Interrupt sensitivity register for private peripheral interrupts (PPI)
    pub icfr_1_ppi: u32,
    pub icfr_2_spi: u32,
    pub icfr_3_spi: u32,
    pub icfr_4_spi: u32,
    pub icfr_5_spi: u32,
    _reserved_9: [u32; 0x3A],
    pub ppi_status: u32,
    pub spi_status_0: u32,
    pub spi_status_1: u32,
    _reserved_10: [u32; 0x7D],
    /// Software Generated Interrupt Register.
    pub sgir: u32,
    _reserved_11: [u32; 0x33],
    pub pidr_4: u32,
    pub pidr_5: u32,
    pub pidr_6: u32,
    pub pidr_7: u32,
    pub pidr_0: u32,
    pub pidr_1: u32,
    pub pidr_2: u32,
    pub pidr_3: u32,
    pub cidr: [u32; 4],
}

const_assert_eq!(core::mem::offset_of!(GicDistributor, iser), 0x100);
const_assert_eq!(core::mem::offset_of!(GicDistributor, icer), 0x180);
const_assert_eq!(core::mem::offset_of!(GicDistributor, ipr), 0x400);
const_assert_eq!(core::mem::offset_of!(GicDistributor, iptr_spi), 0x820);
const_assert_eq!(core::mem::offset_of!(GicDistributor, icfr_2_spi), 0xC08);
const_assert_eq!(core::mem::offset_of!(GicDistributor, sgir), 0xF00);
const_assert_eq!(core::mem::offset_of!(GicDistributor, pidr_4), 0xFD0);
const_assert_eq!(core::mem::offset_of!(GicDistributor, cidr), 0xFF0);
const_assert_eq!(core::mem::size_of::<GicDistributor>(), 0x1000);

/// CPU interface control register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct InterfaceControl {
    #[bit(4, rw)]
    sbpr: bool,
    #[bit(3, rw)]
    fiq_en: bool,
    #[bit(2, rw)]
    ack_ctrl: bool,
    #[bit(1, rw)]
    enable_non_secure: bool,
    #[bit(0, rw)]
    enable_secure: bool,
}

/// Priority Mask Register
#[bitbybit::bitfield(u32, debug)]
pub struct PriorityRegister {
    #[bits(0..=7, rw)]
    priority: u8,
}

/// Interrupt acknowledge and end of interrupt register layout.
#[bitbybit::bitfield(u32, debug)]
pub struct InterruptSignalRegister {
    #[bits(10..=12, rw)]
    cpu_id: u3,
    #[bits(0..=9, rw)]
    ack_int_id: u10,
}

/// GIC CPU interface registers.
#[derive(derive_mmio::Mmio)]
#[repr(C, align(8))]
pub struct GicCpuInterface {
    /// CPU Interface Control Register (ICR).
    pub icr: InterfaceControl,
    /// Interrupt Priority Mask Register.
    pub pmr: PriorityRegister,
    /// Binary Point Register.
    pub bpr: u32,
    /// Interrupt Acknowledge Register. Reading it acknowledges the interrupt.
    #[mmio(Read)]
    pub iar: InterruptSignalRegister,
    /// End of Interrupt Register.
    #[mmio(Write)]
    pub eoir: InterruptSignalRegister,
    /// Running Priority Register.
    #[mmio(PureRead)]
    pub rpr: PriorityRegister,
    /// Highest Pending Interrupt Register.
    #[mmio(PureRead)]
    pub hpir: InterruptSignalRegister,
    /// Aliased Binary Point Register
    pub abpr: u32,
    _reserved_0: [u32; 0x37],
    /// CPU Interface Identification Register.
    #[mmio(PureRead)]
    pub iidr: u32,
}

const_assert_eq!(core::mem::size_of::<GicCpuInterface>(), 0x100);

impl GicCpuInterface {
    /// Create a new Global Interrupt Controller CPU MMIO instance at the fixed address of the
    /// processing system.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioGicCpuInterface<'static> {
        unsafe { Self::new_mmio_at(GICC_BASE_ADDR) }
    }
}
