#![no_std]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

#[cfg(test)]
extern crate std;

mod registers;
mod ring_buffer;
mod uart;

pub use registers::{
    DATA_READY, Mmio, RegisterMap, UART_INT_RX, UART_INT_TX, UartRegisters, XMT_FIFO_EMPTY,
    XMT_FIFO_FULL,
};
pub use ring_buffer::{Consumer, Producer, RingBuffer};
pub use uart::{UART_BUF_SIZE, UartBuffers, UartHandle, UartIrq, init};
