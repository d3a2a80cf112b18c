//! Canonical structured event names used across `nmea-injector`.

// Injector and outbound writer events.
pub const INJECT_QUEUE_FULL: &str = "inject_queue_full";
pub const INJECT_DECLINED: &str = "inject_declined";
pub const INJECT_REJECTED: &str = "inject_rejected";
pub const OUTBOUND_SEND_ATTEMPT: &str = "outbound_send_attempt";
pub const OUTBOUND_SEND_OK: &str = "outbound_send_ok";
pub const OUTBOUND_SEND_FAILED: &str = "outbound_send_failed";
pub const OUTBOUND_QUEUE_CLOSED: &str = "outbound_queue_closed";
pub const OUTBOUND_WRITER_JOIN_FAILED: &str = "outbound_writer_join_failed";

// Listener events.
pub const LISTENER_START: &str = "listener_start";
pub const LISTENER_STOP: &str = "listener_stop";
pub const LISTENER_FAILED: &str = "listener_failed";
pub const LISTENER_RECEIVE: &str = "listener_receive";
pub const LISTENER_READ_ABANDONED: &str = "listener_read_abandoned";
pub const LISTENER_DISCARD_OVERSIZED: &str = "listener_discard_oversized";
pub const TCP_PEER_ACCEPTED: &str = "tcp_peer_accepted";
pub const TCP_PEER_REFUSED: &str = "tcp_peer_refused";
pub const TCP_PEER_CLOSED: &str = "tcp_peer_closed";
pub const TCP_PEER_READ_FAILED: &str = "tcp_peer_read_failed";

// Control-plane lifecycle events.
pub const SOCKET_REGISTER_START: &str = "socket_register_start";
pub const SOCKET_REGISTER_OK: &str = "socket_register_ok";
pub const SOCKET_REGISTER_FAILED: &str = "socket_register_failed";
pub const SOCKET_DEREGISTER_START: &str = "socket_deregister_start";
pub const SOCKET_DEREGISTER_OK: &str = "socket_deregister_ok";
pub const SOCKET_DEREGISTER_FAILED: &str = "socket_deregister_failed";
pub const SOCKET_FAILURE_CLEANUP: &str = "socket_failure_cleanup";
pub const SOCKET_FAILURE_STALE: &str = "socket_failure_stale";
pub const CONTROLLER_START: &str = "controller_start";
pub const CONTROLLER_SHUTDOWN_START: &str = "controller_shutdown_start";
pub const CONTROLLER_SHUTDOWN_OK: &str = "controller_shutdown_ok";
