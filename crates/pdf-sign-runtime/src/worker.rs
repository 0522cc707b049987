use crate::{SignCommand, SignUpdate, handlers};
use pdf_fields::{FieldRecord, FieldStorage};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Async worker task that processes commands and sends updates.
///
/// Runs until every command sender is dropped.
pub async fn worker_task<S: FieldStorage>(
    storage: S,
    mut command_rx: mpsc::UnboundedReceiver<SignCommand>,
    update_tx: mpsc::UnboundedSender<SignUpdate>,
) {
    // Commands pulled off the channel while collapsing saves
    let mut backlog = VecDeque::new();

    loop {
        let cmd = match backlog.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        process_command(cmd, &storage, &mut command_rx, &mut backlog, &update_tx).await;
    }
    log::debug!("Worker stopped: command channel closed");
}

async fn process_command<S: FieldStorage>(
    cmd: SignCommand,
    storage: &S,
    command_rx: &mut mpsc::UnboundedReceiver<SignCommand>,
    backlog: &mut VecDeque<SignCommand>,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    match cmd {
        SignCommand::SaveFields { pdf_id, records } => {
            let records = take_newest_save(&pdf_id, records, command_rx, backlog);
            handlers::handle_save_fields(storage, pdf_id, records, update_tx).await;
        }
        SignCommand::LoadFields { pdf_id } => {
            handlers::handle_load_fields(storage, pdf_id, update_tx).await;
        }
        SignCommand::LoadDocument { path } => {
            handlers::handle_load_document(path, update_tx).await;
        }
        SignCommand::LoadConfig { path } => {
            handlers::handle_load_config(path, update_tx).await;
        }
    }
}

/// Collapse queued saves of the same document into the most recent one.
///
/// Other commands keep their order in the backlog. A queued load of the
/// same document ends the search, so it still observes the save before it.
fn take_newest_save(
    pdf_id: &str,
    mut records: Vec<FieldRecord>,
    command_rx: &mut mpsc::UnboundedReceiver<SignCommand>,
    backlog: &mut VecDeque<SignCommand>,
) -> Vec<FieldRecord> {
    while let Ok(next_cmd) = command_rx.try_recv() {
        backlog.push_back(next_cmd);
    }

    let mut i = 0;
    while i < backlog.len() {
        let same_document = match &backlog[i] {
            SignCommand::SaveFields { pdf_id: next, .. } => next == pdf_id,
            SignCommand::LoadFields { pdf_id: next } if next == pdf_id => break,
            _ => false,
        };
        if !same_document {
            i += 1;
            continue;
        }

        if let Some(SignCommand::SaveFields { records: newer, .. }) = backlog.remove(i) {
            log::debug!("Discarding queued save for {}, using newer request", pdf_id);
            records = newer;
        }
    }
    records
}
