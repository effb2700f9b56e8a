//! The application and interrupt halves of the duplex driver.
//!
//! [`init`] partitions the two software FIFOs between the contexts: the
//! application produces into the transmit buffer and consumes the receive
//! buffer, the interrupt handler does the opposite. Bytes flow
//!
//! ```text
//! app -> send -> TX buffer -> drain -> hardware TX FIFO
//! hardware RX FIFO -> fill -> RX buffer -> read -> app
//! ```
//!
//! with the transmit interrupt armed by [`UartHandle::send`] and disarmed
//! by the drain routine once the transmit buffer runs dry.

use crate::registers::{
    DATA_READY, UART_INT_RX, UART_INT_TX, UartRegisters, XMT_FIFO_EMPTY, XMT_FIFO_FULL,
};
use crate::ring_buffer::{Consumer, Producer, RingBuffer};

/// Capacity of each software FIFO, in bytes.
pub const UART_BUF_SIZE: usize = 1024;

/// Storage for the two software FIFOs.
///
/// `const`-constructible so firmware can reserve it in a `static` and hand
/// it to [`init`] once the register addresses are known.
pub struct UartBuffers {
    tx: RingBuffer<UART_BUF_SIZE>,
    rx: RingBuffer<UART_BUF_SIZE>,
}

impl UartBuffers {
    /// Creates storage with both FIFOs empty.
    pub const fn new() -> Self {
        UartBuffers {
            tx: RingBuffer::new(),
            rx: RingBuffer::new(),
        }
    }
}

impl Default for UartBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-side handle: enqueues bytes for transmission and polls for
/// received bytes.
pub struct UartHandle<'a, R> {
    tx: Producer<'a, UART_BUF_SIZE>,
    rx: Consumer<'a, UART_BUF_SIZE>,
    regs: R,
}

/// Interrupt-side handle: services the UART interrupt, moving bytes between
/// the hardware FIFOs and the software buffers.
pub struct UartIrq<'a, R> {
    tx: Consumer<'a, UART_BUF_SIZE>,
    rx: Producer<'a, UART_BUF_SIZE>,
    regs: R,
}

/// Initializes the driver core: resets both FIFOs and partitions them into
/// the application and interrupt halves.
///
/// [`UartHandle`] stays with the application/polling context; [`UartIrq`]
/// moves to wherever the platform dispatches the UART interrupt. The split
/// fixes the producer and consumer role of each FIFO per context, which is
/// what makes the shared cursors safe without a lock.
///
/// Must run before the UART interrupt is unmasked at the interrupt
/// controller.
pub fn init<R: UartRegisters + Clone>(
    regs: R,
    bufs: &mut UartBuffers,
) -> (UartHandle<'_, R>, UartIrq<'_, R>) {
    let (tx_prod, tx_cons) = bufs.tx.split();
    let (rx_prod, rx_cons) = bufs.rx.split();
    (
        UartHandle {
            tx: tx_prod,
            rx: rx_cons,
            regs: regs.clone(),
        },
        UartIrq {
            tx: tx_cons,
            rx: rx_prod,
            regs,
        },
    )
}

impl<R: UartRegisters> UartHandle<'_, R> {
    /// Enqueues `data` for transmission and arms the transmit interrupt.
    ///
    /// Non-blocking: returns as soon as the bytes are in the transmit
    /// buffer. The buffer holds at most [`UART_BUF_SIZE`] in-flight bytes
    /// and performs no overrun check — if `data` outruns what the interrupt
    /// handler has drained, the oldest unsent bytes are silently
    /// overwritten.
    pub fn send(&mut self, data: &[u8]) {
        for &byte in data {
            self.tx.push(byte);
        }
        // The control and mask updates are read-modify-write sequences; hold
        // off the interrupt handler so its disarm cannot interleave.
        critical_section::with(|_| {
            // Request a transmit-empty interrupt, then unmask it.
            self.regs.control_set(XMT_FIFO_EMPTY);
            self.regs.intr_mask_set(UART_INT_TX);
        });
    }

    /// Takes the oldest received byte, or `None` if nothing has arrived.
    ///
    /// Non-blocking; the caller polls.
    pub fn read(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// Fills `buf` with received bytes, stopping when `buf` is full or the
    /// receive buffer runs dry. Returns the number of bytes written.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

impl<R: UartRegisters> UartIrq<'_, R> {
    /// Services a pending UART interrupt.
    ///
    /// Call from the platform's interrupt vector for this UART. Reads the
    /// interrupt source register once, acknowledges and services receive
    /// before transmit, and returns without re-checking — sources that
    /// became pending during execution arrive as a new interrupt.
    pub fn on_interrupt(&mut self) {
        let pending = self.regs.intr_status();
        if pending & UART_INT_RX != 0 {
            self.regs.intr_ack(UART_INT_RX);
            self.fill();
        }
        if pending & UART_INT_TX != 0 {
            self.regs.intr_ack(UART_INT_TX);
            self.drain();
        }
    }

    /// Moves received bytes from the hardware FIFO into the receive buffer.
    ///
    /// Runs until the hardware reports no more data. The receive buffer
    /// push is unchecked; see [`UartHandle::send`] for the overrun
    /// contract, which applies to this direction as well.
    fn fill(&mut self) {
        while self.regs.status() & DATA_READY != 0 {
            self.rx.push(self.regs.read_rx_data());
        }
    }

    /// Feeds the hardware FIFO from the transmit buffer, disarming the
    /// transmit interrupt once the buffer runs dry.
    ///
    /// Only proceeds when the hardware reports its transmit FIFO empty, the
    /// condition the interrupt was armed on. The transmit interrupt stays
    /// armed if the hardware FIFO fills before the buffer empties; it is
    /// never disarmed while unsent bytes remain.
    fn drain(&mut self) {
        if self.regs.status() & XMT_FIFO_EMPTY == 0 {
            return;
        }
        while self.regs.status() & XMT_FIFO_FULL == 0 {
            match self.tx.pop() {
                Some(byte) => self.regs.write_tx_data(byte),
                None => {
                    // Nothing left to send; stop transmit interrupts until
                    // the next send() arms them again.
                    self.regs.intr_mask_clear(UART_INT_TX);
                    return;
                }
            }
        }
    }
}
