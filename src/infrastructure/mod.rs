pub mod firestore;
pub mod queue;
