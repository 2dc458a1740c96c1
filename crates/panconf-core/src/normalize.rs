// ── Normalizer ──

use crate::device::Instance;
use crate::record::Record;

/// Turn one instance into a record holding exactly `fields`, in that order.
///
/// Absent values are omitted when `drop_absent` is set, otherwise kept as null.
pub fn normalize(instance: &Instance, fields: &[String], drop_absent: bool) -> Record {
    let mut record = Record::new();
    for field in fields {
        let value = instance.field(field);
        if drop_absent && value.is_absent() {
            continue;
        }
        record.insert(field.as_str(), value);
    }
    record
}
