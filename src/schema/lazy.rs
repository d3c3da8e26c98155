//! Deferred schema construction
//!
//! Schema composition is acyclic by reference; a recursive shape,
//! such as a tree node holding a vector of itself, cannot be built by
//! plain combinator application, because the inner schema would have
//! to exist before the outer one. [`lazy`] breaks the cycle: it
//! defers the factory call until the schema is first exercised, and
//! memoizes the result so the factory runs at most once per schema
//! instance.
//!
//! Every cycle in a schema graph must pass through exactly one `lazy`
//! node; constructing a schema that references itself directly is a
//! program error (it simply cannot be expressed against this API
//! without infinite recursion at construction time).

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::parse::Reader;
use crate::schema::BcsType;
use crate::write::Writer;

/// Schema that builds its inner schema on first use.
///
/// `factory` is invoked at most once, by whichever operation touches
/// the schema first; every subsequent dispatch reuses the memoized
/// result. The deferred schema behaves identically to the one the
/// factory produces, except for its display name, which is fixed at
/// `lazy` until the caller [`named`](BcsType::named)s it.
#[must_use]
pub fn lazy<T, I, F>(factory: F) -> BcsType<T, I>
where
    T: 'static,
    I: 'static,
    F: Fn() -> BcsType<T, I> + Send + Sync + 'static,
{
    let cell: Arc<OnceCell<BcsType<T, I>>> = Arc::new(OnceCell::new());
    let factory = Arc::new(factory);

    let read = {
        let cell = cell.clone();
        let factory = factory.clone();
        move |r: &mut Reader<'_>| cell.get_or_init(|| factory()).read(r)
    };
    let write = {
        let cell = cell.clone();
        let factory = factory.clone();
        move |v: &I, w: &mut Writer| {
            let inner = cell.get_or_init(|| factory());
            (inner.write_fn())(v, w)
        }
    };
    let validate = {
        let cell = cell.clone();
        let factory = factory.clone();
        move |v: &I| cell.get_or_init(|| factory()).validate(v)
    };
    let serialized_size = {
        move |v: &I| cell.get_or_init(|| factory()).serialized_size(v)
    };

    BcsType::new("lazy", read, write)
        .with_validate(validate)
        .with_serialized_size(serialized_size)
}

/// Recursive tree fixture shared by the tests below: a node is a
/// `u8` label followed by a vector of child nodes.
#[cfg(test)]
fn tree_node() -> crate::DynSchema {
    crate::record(
        "TreeNode",
        vec![
            ("label", crate::u8().to_dynamic()),
            ("children", lazy(|| crate::vector(tree_node()).to_dynamic())),
        ],
    )
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::hex;
    use crate::value::{Fields, Value};

    fn node(label: u8, children: Vec<Value>) -> Value {
        let mut fields = Fields::new();
        fields.insert("label".into(), Value::U8(label));
        fields.insert("children".into(), Value::Seq(children));
        Value::Record(fields)
    }

    #[test]
    fn recursive_schema_round_trips() {
        let schema = super::tree_node();
        let tree = node(1, vec![node(2, vec![node(4, vec![])]), node(3, vec![])]);
        let env = schema.serialize(&tree).unwrap();
        assert_eq!(env.to_bytes(), hex!("0102020104000300"));
        assert_eq!(env.parse().unwrap(), tree);
    }

    #[test]
    fn factory_runs_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schema = {
            let calls = calls.clone();
            lazy(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                crate::u16()
            })
        };
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        for _ in 0..3 {
            assert_eq!(schema.to_bytes(&7u16).unwrap(), hex!("0700"));
            assert_eq!(schema.parse(&hex!("0700")).unwrap(), 7u16);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
