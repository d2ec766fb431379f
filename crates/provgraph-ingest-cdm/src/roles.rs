//! Event-type role table for CDM.
//!
//! One entry per event type observed across the engagement datasets
//! (cadets, theia, clearscope, fivedirections, trace). Which record fields
//! become the edge's source and destination follows the direction of
//! information flow for the underlying syscall: a read flows object →
//! subject, a write subject → object, a rename object1 → object2, and a
//! handful of events (fcntl, mmap, other) flow both ways and are emitted
//! twice. Event types with no resolvable direction (exit, dup, boot) drop
//! their records.

use provgraph_core::{Direction, RoleRule, RoleTable};

const SUB_TO_OBJ: RoleRule = RoleRule::directed(Direction::SubjectToObject);
const OBJ_TO_SUB: RoleRule = RoleRule::directed(Direction::ObjectToSubject);
const OBJ_TO_OBJ2: RoleRule = RoleRule::directed(Direction::ObjectToObject2);
const SYMMETRIC: RoleRule = RoleRule::symmetric(Direction::SubjectToObject);
const UNDIRECTED: RoleRule = RoleRule::directed(Direction::Undirected);

/// Every known event type with its role rule.
pub const EVENT_RULES: [(&str, RoleRule); 50] = [
    ("EVENT_ACCEPT", OBJ_TO_SUB),
    ("EVENT_ADD_OBJECT_ATTRIBUTE", OBJ_TO_OBJ2),
    ("EVENT_BIND", SUB_TO_OBJ),
    ("EVENT_BOOT", UNDIRECTED),
    ("EVENT_CHANGE_PRINCIPAL", SUB_TO_OBJ),
    ("EVENT_CHECK_FILE_ATTRIBUTES", OBJ_TO_SUB),
    ("EVENT_CLONE", SUB_TO_OBJ),
    ("EVENT_CLOSE", SUB_TO_OBJ),
    ("EVENT_CONNECT", SUB_TO_OBJ),
    ("EVENT_CORRELATION", OBJ_TO_OBJ2),
    ("EVENT_CREATE_OBJECT", SUB_TO_OBJ),
    ("EVENT_CREATE_THREAD", SUB_TO_OBJ),
    ("EVENT_DUP", UNDIRECTED),
    ("EVENT_EXECUTE", SUB_TO_OBJ),
    ("EVENT_EXIT", UNDIRECTED),
    ("EVENT_FCNTL", SYMMETRIC),
    ("EVENT_FLOWS_TO", OBJ_TO_OBJ2),
    ("EVENT_FORK", SUB_TO_OBJ),
    ("EVENT_LINK", OBJ_TO_OBJ2),
    ("EVENT_LOADLIBRARY", OBJ_TO_SUB),
    ("EVENT_LOGCLEAR", SUB_TO_OBJ),
    ("EVENT_LOGIN", SUB_TO_OBJ),
    ("EVENT_LOGOUT", SUB_TO_OBJ),
    ("EVENT_LSEEK", SUB_TO_OBJ),
    ("EVENT_MMAP", SYMMETRIC),
    ("EVENT_MODIFY_FILE_ATTRIBUTES", SUB_TO_OBJ),
    ("EVENT_MODIFY_PROCESS", SUB_TO_OBJ),
    ("EVENT_MOUNT", SUB_TO_OBJ),
    ("EVENT_MPROTECT", SUB_TO_OBJ),
    ("EVENT_OPEN", SUB_TO_OBJ),
    ("EVENT_OTHER", SYMMETRIC),
    ("EVENT_READ", OBJ_TO_SUB),
    ("EVENT_READ_SOCKET_PARAMS", OBJ_TO_SUB),
    ("EVENT_RECVFROM", OBJ_TO_SUB),
    ("EVENT_RECVMSG", OBJ_TO_SUB),
    ("EVENT_RENAME", OBJ_TO_OBJ2),
    ("EVENT_SENDMSG", SUB_TO_OBJ),
    ("EVENT_SENDTO", SUB_TO_OBJ),
    ("EVENT_SERVICEINSTALL", SUB_TO_OBJ),
    ("EVENT_SHM", OBJ_TO_OBJ2),
    ("EVENT_SIGNAL", SUB_TO_OBJ),
    ("EVENT_STARTSERVICE", SUB_TO_OBJ),
    ("EVENT_TRUNCATE", SUB_TO_OBJ),
    ("EVENT_UMOUNT", SUB_TO_OBJ),
    ("EVENT_UNIT", SUB_TO_OBJ),
    ("EVENT_UNLINK", SUB_TO_OBJ),
    ("EVENT_UPDATE", OBJ_TO_OBJ2),
    ("EVENT_WAIT", OBJ_TO_SUB),
    ("EVENT_WRITE", SUB_TO_OBJ),
    ("EVENT_WRITE_SOCKET_PARAMS", SUB_TO_OBJ),
];

/// Build the CDM role table.
pub fn role_table() -> RoleTable {
    RoleTable::from_entries(&EVENT_RULES)
}
