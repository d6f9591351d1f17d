mod arena;
mod handle;
mod node;
mod raw_btree_map;

pub(crate) use raw_btree_map::RawBTreeMap;
