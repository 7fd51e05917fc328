//! # Global Interrupt Controller (GIC) module
//!
//! The primary interface to configure and allow handling the interrupts are the
//! [GicConfigurator] and the [GicInterruptHelper] structures.
//!
//! The configurator only exposes what a single-core bare-metal application needs: routing
//! shared peripheral interrupts (SPI) to CPU0, masking and unmasking individual SPIs and
//! starting the distributor and CPU interface.
use cortex_ar::interrupt;
use zynq7000::gic::{
    DistributorControlRegister, GicCpuInterface, InterfaceControl, InterruptSignalRegister,
    MmioGicCpuInterface, MmioGicDistributor, PriorityRegister,
};

pub const SPURIOUS_INTERRUPT_ID: u32 = 1023;

/// Number of interrupt IDs handled by the distributor.
pub const NUM_OF_INTERRUPTS: usize = 96;

/// These fixed values must be programmed according to the Zynq7000 TRM p.236.
/// Configures #32 to #47.
pub const ICFR_2_FIXED_VALUE: u32 = 0b01010101010111010101010001011111;
/// These fixed values must be programmed according to the Zynq7000 TRM p.236.
/// This configures `PL[2:0]` to high-level sensitivity.
/// Configures #48 to #63.
pub const ICFR_3_FIXED_VALUE: u32 = 0b01010101010101011101010101010101;
/// These fixed values must be programmed according to the Zynq7000 TRM p.236.
/// This configures `PL[7:3]` to high-level sensitivity.
/// Configures #64 to #79.
pub const ICFR_4_FIXED_VALUE: u32 = 0b01110101010101010101010101010101;
/// These fixed values must be programmed according to the Zynq7000 TRM p.236.
/// This configures `PL[15:8]` to high-level sensitivity.
/// Configures #80 to #95.
pub const ICFR_5_FIXED_VALUE: u32 = 0b00000011010101010101010101010101;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCpu {
    None = 0b00,
    Cpu0 = 0b01,
    Cpu1 = 0b10,
    Both = 0b11,
}

/// Private Peripheral Interrupt (PPI) which are private to the CPU.
#[derive(Debug, Eq, PartialEq, Clone, Copy, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum PpiInterrupt {
    GlobalTimer = 27,
    // Interrupt signal from the PL. CPU0: `IRQF2P[18]` and CPU1: `IRQF2P[19]`
    NFiq = 28,
    CpuPrivateTimer = 29,
    /// AWDT0 and AWDT1 for each CPU.
    Awdt = 30,
    // Interrupt signal from the PL. CPU0: `IRQF2P[16]` and CPU1: `IRQF2P[17]`
    NIrq = 31,
}

/// Shared Peripheral Interrupt IDs.
#[derive(Debug, Eq, PartialEq, Clone, Copy, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum SpiInterrupt {
    Cpu0 = 32,
    Cpu1 = 33,
    L2Cache = 34,
    Ocm = 35,
    _Reserved0 = 36,
    Pmu0 = 37,
    Pmu1 = 38,
    Xadc = 39,
    DevC = 40,
    Swdt = 41,
    Ttc00 = 42,
    Ttc01 = 43,
    Ttc02 = 44,
    DmacAbort = 45,
    Dmac0 = 46,
    Dmac1 = 47,
    Dmac2 = 48,
    Dmac3 = 49,
    Smc = 50,
    Qspi = 51,
    Gpio = 52,
    Usb0 = 53,
    Eth0 = 54,
    Eth0Wakeup = 55,
    Sdio0 = 56,
    I2c0 = 57,
    Spi0 = 58,
    Uart0 = 59,
    Can0 = 60,
    Pl0 = 61,
    Pl1 = 62,
    Pl2 = 63,
    Pl3 = 64,
    Pl4 = 65,
    Pl5 = 66,
    Pl6 = 67,
    Pl7 = 68,
    Ttc10 = 69,
    Ttc11 = 70,
    Ttc12 = 71,
    Dmac4 = 72,
    Dmac5 = 73,
    Dmac6 = 74,
    Dmac7 = 75,
    Usb1 = 76,
    Eth1 = 77,
    Eth1Wakeup = 78,
    Sdio1 = 79,
    I2c1 = 80,
    Spi1 = 81,
    Uart1 = 82,
    Can1 = 83,
    Pl8 = 84,
    Pl9 = 85,
    Pl10 = 86,
    Pl11 = 87,
    Pl12 = 88,
    Pl13 = 89,
    Pl14 = 90,
    Pl15 = 91,
    ScuParity = 92,
}

impl SpiInterrupt {
    /// Index of the 32-bit set/clear-enable register and bit position for this interrupt.
    #[inline]
    pub const fn enable_reg_pos(self) -> (usize, u32) {
        let raw = self as u32;
        ((raw / 32) as usize, raw % 32)
    }

    /// Index of the 32-bit priority or target register and the bit offset of the byte lane
    /// belonging to this interrupt.
    #[inline]
    pub const fn byte_lane_pos(self) -> (usize, u32) {
        let raw = self as u32;
        ((raw / 4) as usize, (raw % 4) * 8)
    }
}

/// Interrupt ID wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Sgi(usize),
    Ppi(PpiInterrupt),
    Spi(SpiInterrupt),
    /// Detects an invalid interrupt ID.
    Invalid(usize),
    /// Spurious interrupt (ID# 1023).
    Spurious,
}

impl Interrupt {
    /// Decode a raw interrupt ID as read from the interrupt acknowledge register.
    pub fn from_raw(int_id: u32) -> Self {
        match int_id {
            0..=15 => Interrupt::Sgi(int_id as usize),
            27..=31 => PpiInterrupt::try_from(int_id as u8)
                .map(Interrupt::Ppi)
                .unwrap_or(Interrupt::Invalid(int_id as usize)),
            32..=92 => SpiInterrupt::try_from(int_id as u8)
                .map(Interrupt::Spi)
                .unwrap_or(Interrupt::Invalid(int_id as usize)),
            SPURIOUS_INTERRUPT_ID => Interrupt::Spurious,
            _ => Interrupt::Invalid(int_id as usize),
        }
    }

    /// Raw interrupt ID, [None] for the spurious interrupt.
    pub fn raw_id(&self) -> Option<usize> {
        match self {
            Interrupt::Sgi(id) | Interrupt::Invalid(id) => Some(*id),
            Interrupt::Ppi(ppi) => Some(*ppi as usize),
            Interrupt::Spi(spi) => Some(*spi as usize),
            Interrupt::Spurious => None,
        }
    }
}

#[derive(Debug)]
pub struct InterruptInfo {
    raw_reg: InterruptSignalRegister,
    interrupt: Interrupt,
}

impl InterruptInfo {
    pub fn raw_reg(&self) -> InterruptSignalRegister {
        self.raw_reg
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt
    }
}

/// Higher-level GIC controller for the Zynq70000 SoC.
///
/// 1. Create the controller using [Self::new_with_init]. The constructor configures all PL
///    interrupt sensitivities to high-level sensitivity, programs the fixed sensitivities the
///    TRM requires and opens the priority mask.
/// 2. Route and unmask the required shared peripheral interrupts with
///    [Self::set_spi_interrupt_cpu_target] and [Self::enable_spi_interrupt].
/// 3. Start the GIC with [Self::enable].
/// 4. Enable interrupts for the Cortex-A core by calling [Self::enable_interrupts].
///
/// For the handling of the interrupts, use the [GicInterruptHelper].
pub struct GicConfigurator {
    pub gicc: MmioGicCpuInterface<'static>,
    pub gicd: MmioGicDistributor<'static>,
}

impl GicConfigurator {
    /// Create a new GIC controller instance and call [Self::initialize].
    #[inline]
    pub fn new_with_init(
        gicc: MmioGicCpuInterface<'static>,
        gicd: MmioGicDistributor<'static>,
    ) -> Self {
        let mut gic = GicConfigurator { gicc, gicd };
        gic.initialize();
        gic
    }

    /// Programs the fixed SPI sensitivities and sets the priority mask to 0xff.
    ///
    /// The interrupts coming from the programmable logic are configured to high level
    /// sensitivity, which matches the level-triggered `ip2intc_irpt` output of the AXI IP
    /// cores.
    #[inline]
    pub fn initialize(&mut self) {
        self.gicd.write_icfr_2_spi(ICFR_2_FIXED_VALUE);
        self.gicd.write_icfr_3_spi(ICFR_3_FIXED_VALUE);
        self.gicd.write_icfr_4_spi(ICFR_4_FIXED_VALUE);
        self.gicd.write_icfr_5_spi(ICFR_5_FIXED_VALUE);
        self.set_priority_mask(0xff);
    }

    /// Set the priority mask for the CPU.
    ///
    /// Only interrupts with a higher priority than the mask will be accepted. A lower numerical
    /// number means a higher priority, so 0x0 masks everything and 0xff masks nothing.
    pub fn set_priority_mask(&mut self, mask: u8) {
        self.gicc
            .write_pmr(PriorityRegister::new_with_raw_value(mask as u32));
    }

    /// Route a SPI interrupt to the given CPU(s), leaving the other byte lanes untouched.
    #[inline]
    pub fn set_spi_interrupt_cpu_target(&mut self, spi_int: SpiInterrupt, target: TargetCpu) {
        let (reg_idx, offset) = spi_int.byte_lane_pos();
        // The target registers only cover the SPI range.
        let spi_reg_idx = reg_idx - 8;
        // Unwrap okay, calculated index is always valid.
        self.gicd
            .modify_iptr_spi(spi_reg_idx, |v| {
                (v & !(0xff << offset)) | ((target as u32) << offset)
            })
            .unwrap();
    }

    /// Unmask a SPI interrupt at the distributor.
    #[inline]
    pub fn enable_spi_interrupt(&mut self, spi_int: SpiInterrupt) {
        let (reg_idx, bit_pos) = spi_int.enable_reg_pos();
        // Unwrap okay, valid index. Writing zeros to the set-enable register has no effect.
        self.gicd.write_iser(reg_idx, 1 << bit_pos).unwrap();
    }

    /// Mask a SPI interrupt at the distributor.
    #[inline]
    pub fn disable_spi_interrupt(&mut self, spi_int: SpiInterrupt) {
        let (reg_idx, bit_pos) = spi_int.enable_reg_pos();
        // Unwrap okay, valid index. Writing zeros to the clear-enable register has no effect.
        self.gicd.write_icer(reg_idx, 1 << bit_pos).unwrap();
    }

    /// Enable the GIC assuming a possibly non-secure configuration.
    ///
    /// - CPU interface: Secure and non-secure interrupts are enabled. SBPR, FIQen and AckCtrl
    ///   fields set to default value 0.
    /// - Distributor interface: Both non-secure and secure interrupt distribution enabled.
    ///
    /// This will not enable the interrupt exception for the Cortex-A core. You also have to
    /// call [Self::enable_interrupts] for interrupts to work.
    pub fn enable(&mut self) {
        self.update_ctrl_regs(
            InterfaceControl::builder()
                .with_sbpr(false)
                .with_fiq_en(false)
                .with_ack_ctrl(false)
                .with_enable_non_secure(true)
                .with_enable_secure(true)
                .build(),
            DistributorControlRegister::builder()
                .with_enable_non_secure(true)
                .with_enable_secure(true)
                .build(),
        );
    }

    /// Enable the regular interrupt exception for the Cortex-A core. No GIC register is
    /// touched.
    ///
    /// # Safety
    ///
    /// Do not call this in a critical section.
    pub unsafe fn enable_interrupts() {
        unsafe {
            interrupt::enable();
        }
    }

    /// Update the control registers which control the safety configuration and which also enable
    /// the GIC.
    pub fn update_ctrl_regs(&mut self, icr: InterfaceControl, dcr: DistributorControlRegister) {
        self.gicc.write_icr(icr);
        self.gicd.write_dcr(dcr);
    }
}

/// Helper structure which should only be used inside the interrupt handler once the GIC has
/// been configured with the [GicConfigurator].
pub struct GicInterruptHelper(MmioGicCpuInterface<'static>);

impl GicInterruptHelper {
    /// Create the interrupt helper with the fixed GICC MMIO instance.
    pub const fn new() -> Self {
        GicInterruptHelper(unsafe { GicCpuInterface::new_mmio_fixed() })
    }

    /// Create the interrupt helper for a CPU interface at a specific address.
    ///
    /// # Safety
    ///
    /// `gicc_base` must be the address of a GIC CPU interface.
    pub const unsafe fn new_at(gicc_base: usize) -> Self {
        GicInterruptHelper(unsafe { GicCpuInterface::new_mmio_at(gicc_base) })
    }

    /// Acknowledges an interrupt by reading the IAR register and returning the interrupt context
    /// information structure.
    ///
    /// This should be called at the start of an interrupt handler.
    pub fn acknowledge_interrupt(&mut self) -> InterruptInfo {
        let iar = self.0.read_iar();
        InterruptInfo {
            interrupt: Interrupt::from_raw(iar.ack_int_id().value() as u32),
            raw_reg: iar,
        }
    }

    /// Acknowledges the end of an interrupt by writing the EOIR register of the GICC.
    ///
    /// This should be called at the end of an interrupt handler. Spurious interrupts must not
    /// be completed, so they are skipped.
    pub fn end_of_interrupt(&mut self, irq_info: InterruptInfo) {
        if irq_info.interrupt() == Interrupt::Spurious {
            return;
        }
        self.0.write_eoir(irq_info.raw_reg())
    }
}

impl Default for GicInterruptHelper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use core::ptr::{addr_of, addr_of_mut};
    use std::boxed::Box;

    use super::*;

    fn ram_gicc() -> *mut GicCpuInterface {
        Box::leak(Box::new(unsafe { core::mem::zeroed::<GicCpuInterface>() })) as *mut _
    }

    #[test]
    fn acknowledge_decodes_id_and_completes_it() {
        let gicc = ram_gicc();
        // CPU ID 1 in bits 10..=12 must not leak into the interrupt ID.
        unsafe {
            addr_of_mut!((*gicc).iar)
                .write_volatile(InterruptSignalRegister::new_with_raw_value((1 << 10) | 61));
        }
        let mut helper = unsafe { GicInterruptHelper::new_at(gicc as usize) };
        let info = helper.acknowledge_interrupt();
        assert_eq!(info.interrupt(), Interrupt::Spi(SpiInterrupt::Pl0));
        helper.end_of_interrupt(info);
        let eoir = unsafe { addr_of!((*gicc).eoir).read_volatile() };
        assert_eq!(eoir.raw_value(), (1 << 10) | 61);
    }

    #[test]
    fn decode_interrupt_ids() {
        assert_eq!(Interrupt::from_raw(3), Interrupt::Sgi(3));
        assert_eq!(
            Interrupt::from_raw(27),
            Interrupt::Ppi(PpiInterrupt::GlobalTimer)
        );
        assert_eq!(Interrupt::from_raw(61), Interrupt::Spi(SpiInterrupt::Pl0));
        assert_eq!(Interrupt::from_raw(20), Interrupt::Invalid(20));
        assert_eq!(Interrupt::from_raw(93), Interrupt::Invalid(93));
        assert_eq!(
            Interrupt::from_raw(SPURIOUS_INTERRUPT_ID),
            Interrupt::Spurious
        );
    }

    #[test]
    fn raw_id_matches_decoded_id() {
        assert_eq!(Interrupt::from_raw(61).raw_id(), Some(61));
        assert_eq!(Interrupt::from_raw(29).raw_id(), Some(29));
        assert_eq!(Interrupt::Spurious.raw_id(), None);
    }

    #[test]
    fn pl0_register_positions() {
        // ID 61 lives in ICDISER1/ICDICER1, bit 29.
        assert_eq!(SpiInterrupt::Pl0.enable_reg_pos(), (1, 29));
        // ID 61 is byte lane 1 of ICDIPR15/ICDIPTR15.
        assert_eq!(SpiInterrupt::Pl0.byte_lane_pos(), (15, 8));
    }

    #[test]
    fn upper_spi_register_positions() {
        assert_eq!(SpiInterrupt::Pl8.enable_reg_pos(), (2, 20));
        assert_eq!(SpiInterrupt::ScuParity.byte_lane_pos(), (23, 0));
        assert_eq!(SpiInterrupt::Cpu0.byte_lane_pos(), (8, 0));
    }
}
