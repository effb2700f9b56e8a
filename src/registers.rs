//! Typed access to the UART and interrupt-controller register groups.
//!
//! The driver core never touches hardware addresses directly: everything
//! goes through [`UartRegisters`], so the transmit, receive and dispatch
//! logic can run against a simulated backend in tests. [`Mmio`] is the real
//! implementation, bound once at initialization to the platform's address
//! table.

use core::ptr::{with_exposed_provenance, with_exposed_provenance_mut};

/// Transmit interrupt bit in the interrupt mask/status/acknowledge registers.
pub const UART_INT_TX: u8 = 0x08;
/// Receive interrupt bit in the interrupt mask/status/acknowledge registers.
pub const UART_INT_RX: u8 = 0x04;

/// A received byte is available in the hardware receive register.
pub const DATA_READY: u32 = 0x10;
/// The hardware transmit FIFO cannot accept more bytes.
pub const XMT_FIFO_FULL: u32 = 0x40;
/// The hardware transmit FIFO is empty. Also written to the control
/// register to request a transmit-empty interrupt.
pub const XMT_FIFO_EMPTY: u32 = 0x80;

/// Hardware addresses of the UART and interrupt register groups.
///
/// Bound once at initialization from the platform's datasheet values; the
/// core never invents addresses on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct RegisterMap {
    /// Serial configuration register (32-bit).
    pub control: usize,
    /// UART status register (32-bit).
    pub status: usize,
    /// Transmit data register, backed by the hardware TX FIFO (8-bit).
    pub tx_data: usize,
    /// Receive data register, backed by the hardware RX FIFO (8-bit).
    pub rx_data: usize,
    /// Interrupt mask register (8-bit).
    pub intr_mask: usize,
    /// Interrupt source register (8-bit).
    pub intr_status: usize,
    /// Interrupt acknowledge register (8-bit).
    pub intr_ack: usize,
}

/// Register access primitives used by the driver core.
///
/// Every call must reach the hardware; implementations may not buffer or
/// cache register values. Methods take `&self` — hardware registers mutate
/// behind shared handles by nature, and both driver halves hold one.
pub trait UartRegisters {
    /// Reads the UART status register.
    fn status(&self) -> u32;
    /// ORs `bits` into the UART control register.
    fn control_set(&self, bits: u32);
    /// Writes one byte to the transmit data register.
    fn write_tx_data(&self, byte: u8);
    /// Reads one byte from the receive data register.
    fn read_rx_data(&self) -> u8;
    /// ORs `bits` into the interrupt mask register.
    fn intr_mask_set(&self, bits: u8);
    /// Clears `bits` in the interrupt mask register.
    fn intr_mask_clear(&self, bits: u8);
    /// Reads the interrupt source register.
    fn intr_status(&self) -> u8;
    /// Writes `bits` to the interrupt acknowledge register, clearing those
    /// pending sources.
    fn intr_ack(&self, bits: u8);
}

impl<T: UartRegisters> UartRegisters for &T {
    fn status(&self) -> u32 {
        (*self).status()
    }
    fn control_set(&self, bits: u32) {
        (*self).control_set(bits)
    }
    fn write_tx_data(&self, byte: u8) {
        (*self).write_tx_data(byte)
    }
    fn read_rx_data(&self) -> u8 {
        (*self).read_rx_data()
    }
    fn intr_mask_set(&self, bits: u8) {
        (*self).intr_mask_set(bits)
    }
    fn intr_mask_clear(&self, bits: u8) {
        (*self).intr_mask_clear(bits)
    }
    fn intr_status(&self) -> u8 {
        (*self).intr_status()
    }
    fn intr_ack(&self, bits: u8) {
        (*self).intr_ack(bits)
    }
}

/// Memory-mapped implementation of [`UartRegisters`].
///
/// Each method is a single volatile access (or a volatile read-modify-write
/// for the OR/AND-clear primitives) against the bound [`RegisterMap`].
#[derive(Clone, Copy)]
pub struct Mmio {
    map: RegisterMap,
}

impl Mmio {
    /// Binds the register interface to `map`.
    ///
    /// # Safety
    ///
    /// - Every address in `map` must point at the corresponding register of
    ///   a UART that stays powered and mapped for as long as any copy of
    ///   the returned value is live.
    /// - `control` and `status` must be valid for 32-bit accesses, the
    ///   remaining registers for 8-bit accesses.
    /// - The driver must exclusively own these addresses: no other code may
    ///   access them while any copy of the returned value is live.
    pub const unsafe fn new(map: RegisterMap) -> Self {
        Mmio { map }
    }
}

impl UartRegisters for Mmio {
    #[inline]
    fn status(&self) -> u32 {
        // SAFETY: `Mmio::new` guarantees a readable 32-bit register.
        unsafe { with_exposed_provenance::<u32>(self.map.status).read_volatile() }
    }

    #[inline]
    fn control_set(&self, bits: u32) {
        let control = with_exposed_provenance_mut::<u32>(self.map.control);
        // SAFETY: `Mmio::new` guarantees a 32-bit register the driver owns
        // exclusively.
        unsafe { control.write_volatile(control.read_volatile() | bits) };
    }

    #[inline]
    fn write_tx_data(&self, byte: u8) {
        // SAFETY: `Mmio::new` guarantees a writable 8-bit register.
        unsafe { with_exposed_provenance_mut::<u8>(self.map.tx_data).write_volatile(byte) };
    }

    #[inline]
    fn read_rx_data(&self) -> u8 {
        // SAFETY: `Mmio::new` guarantees a readable 8-bit register.
        unsafe { with_exposed_provenance::<u8>(self.map.rx_data).read_volatile() }
    }

    #[inline]
    fn intr_mask_set(&self, bits: u8) {
        let mask = with_exposed_provenance_mut::<u8>(self.map.intr_mask);
        // SAFETY: `Mmio::new` guarantees an 8-bit register the driver owns
        // exclusively.
        unsafe { mask.write_volatile(mask.read_volatile() | bits) };
    }

    #[inline]
    fn intr_mask_clear(&self, bits: u8) {
        let mask = with_exposed_provenance_mut::<u8>(self.map.intr_mask);
        // SAFETY: `Mmio::new` guarantees an 8-bit register the driver owns
        // exclusively.
        unsafe { mask.write_volatile(mask.read_volatile() & !bits) };
    }

    #[inline]
    fn intr_status(&self) -> u8 {
        // SAFETY: `Mmio::new` guarantees a readable 8-bit register.
        unsafe { with_exposed_provenance::<u8>(self.map.intr_status).read_volatile() }
    }

    #[inline]
    fn intr_ack(&self, bits: u8) {
        // SAFETY: `Mmio::new` guarantees a writable 8-bit register.
        unsafe { with_exposed_provenance_mut::<u8>(self.map.intr_ack).write_volatile(bits) };
    }
}
