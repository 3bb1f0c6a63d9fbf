//! Port for handling newly discovered inbound messages.

use courier_types::message::ContactMessage;

/// Receives each new incoming message discovered by a sync worker.
///
/// Implementations own their failure handling (forward to the bus, log,
/// drop); a sink must never fail the worker that invoked it.
pub trait NewMessageSink: Send + Sync + 'static {
    fn handle(
        &self,
        contact_id: &str,
        message: &ContactMessage,
    ) -> impl Future<Output = ()> + Send;
}
