pub mod events;

use self::events::InputEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Host input crossing into the simulation tick. Producers may live on any thread.
pub struct InputQueue {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn push(&self, event: InputEvent) {
        let _ = self.sender.send(event);
    }

    /// Non-blocking. `None` when the queue is empty.
    pub fn pop(&self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }

    /// Everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn sender(&self) -> Sender<InputEvent> {
        self.sender.clone()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
