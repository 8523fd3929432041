use std::sync::mpsc;

use composer_core::Notice;

use crate::ComposerEvent;

/// Message channel towards the user.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub struct ChannelNoticeSink {
    tx: mpsc::Sender<ComposerEvent>,
}

impl ChannelNoticeSink {
    pub fn new(tx: mpsc::Sender<ComposerEvent>) -> Self {
        Self { tx }
    }
}

impl NoticeSink for ChannelNoticeSink {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(ComposerEvent::Notice(notice));
    }
}
