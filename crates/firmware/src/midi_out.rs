//! Sends note messages out of the serial MIDI port.
//!
//! The controller never writes to the port itself. It queues messages without waiting, and a dedicated task drains
//! the queue at the port's pace, so a slow or unplugged link cannot hold up the keyboard.

use defmt::*;
use embassy_stm32::{mode::Async, usart::UartTx};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender, TrySendError},
};
use tritone_lib::sink::{NoteSink, SinkError};
use wmidi::MidiMessage;

/// MIDI's fixed serial rate.
pub const MIDI_BAUD_RATE: u32 = 31_250;

/// Room for every button to be released and struck again by a single transposition, with slack to spare.
const MIDI_QUEUE_LEN: usize = 32;
/// Messages waiting to be written to the serial port.
pub static MIDI_QUEUE: Channel<CriticalSectionRawMutex, MidiMessage<'static>, MIDI_QUEUE_LEN> =
    Channel::new();
pub type MidiQueueSender<'a> =
    Sender<'a, CriticalSectionRawMutex, MidiMessage<'static>, MIDI_QUEUE_LEN>;
pub type MidiQueueReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, MidiMessage<'static>, MIDI_QUEUE_LEN>;

/// A [`NoteSink`] which queues messages for [`midi_out`].
pub struct QueueSink<'a> {
    queue: MidiQueueSender<'a>,
}

impl<'a> QueueSink<'a> {
    pub fn new(queue: MidiQueueSender<'a>) -> Self {
        Self { queue }
    }
}

impl NoteSink for QueueSink<'_> {
    fn send(&mut self, message: MidiMessage<'static>) -> Result<(), SinkError> {
        self.queue
            .try_send(message)
            .map_err(|TrySendError::Full(_)| SinkError::Full)
    }
}

/// Task responsible for writing queued messages to the serial port.
#[embassy_executor::task]
pub async fn midi_out(mut uart: UartTx<'static, Async>, queue: MidiQueueReceiver<'static>) -> ! {
    let mut buf = [0_u8; 3];
    loop {
        let message = queue.receive().await;
        let len = match message.copy_to_slice(&mut buf) {
            Ok(len) => len,
            Err(_) => {
                error!("Note messages should always fit in three bytes");
                continue;
            }
        };

        if let Err(e) = uart.write(&buf[..len]).await {
            warn!("Failed to write MIDI message: {}", e);
        }
    }
}
