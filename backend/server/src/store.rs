//! # Contact Store
//!
//! The list the UI renders, mirrored from the pod after every read or write.
//!
//! - Backed by a `watch` channel, subscribers always see the latest list
//! - Keys handed out to the UI are indices into the current list
use pod::Contact;
use tokio::sync::watch::{Receiver, Sender, channel};

pub struct ContactStore {
    sender: Sender<Vec<Contact>>,
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore {
    pub fn new() -> Self {
        let (sender, _) = channel(Vec::new());

        Self { sender }
    }

    pub fn set(&self, contacts: Vec<Contact>) {
        self.sender.send_replace(contacts);
    }

    pub fn get(&self) -> Vec<Contact> {
        self.sender.borrow().clone()
    }

    pub fn get_at(&self, key: usize) -> Option<Contact> {
        self.sender.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.set(Vec::new());
    }

    pub fn subscribe(&self) -> Receiver<Vec<Contact>> {
        self.sender.subscribe()
    }
}
