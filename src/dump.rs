//! Human-readable rendering of the table layout.

use crate::node::NodeKind;
use crate::table::Table;
use core::fmt;

/// Display adapter returned by `ShadowHashMap::dump`.
///
/// One line per bucket: `index: [node] -> [node] ...`. Entries print as
/// `key = value`, markers as `marker`; a witness is appended as
/// `=> key = value @ bucket`, naming the witnessed entry and its key bucket.
pub struct Dump<'a, K, V> {
    pub(crate) table: &'a Table<K, V>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for Dump<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.table;
        for bucket in 0..t.capacity() {
            write!(f, "{}:", bucket)?;
            if t.buckets[bucket].is_none() {
                f.write_str(" []")?;
            }
            for (i, (_, node)) in t.chain(bucket).enumerate() {
                if i > 0 {
                    f.write_str(" ->")?;
                }
                match node.key_value() {
                    Some((k, v)) => write!(f, " [{:?} = {:?}", k, v)?,
                    None => f.write_str(" [marker")?,
                }
                let target = node.witness().and_then(|w| t.nodes.get(w));
                if let Some(NodeKind::Entry {
                    key,
                    value,
                    key_hash,
                    ..
                }) = target.map(|n| &n.kind)
                {
                    write!(f, " => {:?} = {:?} @ {}", key, value, t.bucket_of(*key_hash))?;
                }
                f.write_str("]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
