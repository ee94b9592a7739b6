//! Control Flow Primitives - Conditional and list specs.
//!
//! - [`show`] - Pick a branch based on a condition
//! - [`each`] - Keyed list rendering
//!
//! Both return plain specs. The reconciler does the rest: a keyed list keeps
//! every entry's nodes across passes, moving them when the order changes.
//!
//! ## each()
//! - Items tracked by key (from `key_fn`)
//! - New keys: entry created
//! - Existing keys: entry updated in place (NO node recreation!)
//! - Removed keys: entry torn down
//! - Duplicate keys: rejected by the pass with `DuplicateKey`

use std::hash::Hash;

use crate::types::Key;

use super::spec::{ListSpec, Spec};

/// Render `then_fn` when `condition` holds, otherwise `else_fn` (or nothing).
///
/// # Example
///
/// ```ignore
/// let spec = show(
///     logged_in,
///     || element("span").child(text("Welcome back")).into(),
///     Some(|| element("a").attr("href", "/login").into()),
/// );
/// ```
pub fn show<ThenF, ElseF>(condition: bool, then_fn: ThenF, else_fn: Option<ElseF>) -> Spec
where
    ThenF: FnOnce() -> Spec,
    ElseF: FnOnce() -> Spec,
{
    if condition {
        then_fn()
    } else {
        else_fn.map_or(Spec::Null, |f| f())
    }
}

/// Render one keyed entry per item.
///
/// `render_fn` receives the item and its key. Whatever it returns gets the
/// key attached, so element and component entries are matched by key across
/// passes.
///
/// # Example
///
/// ```ignore
/// let spec = each(
///     &todos,
///     |todo| todo.id,
///     |todo, _key| element("li").child(text(todo.title.clone())).into(),
/// );
/// ```
pub fn each<T, K, KeyF, RenderF>(items: &[T], key_fn: KeyF, render_fn: RenderF) -> ListSpec
where
    K: Into<Key> + Clone + Eq + Hash,
    KeyF: Fn(&T) -> K,
    RenderF: Fn(&T, &K) -> Spec,
{
    let items = items
        .iter()
        .map(|item| {
            let key = key_fn(item);
            render_fn(item, &key).with_key(key)
        })
        .collect();
    ListSpec { key: None, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{element, text};

    #[test]
    fn test_show_branches() {
        let then = || text("yes");
        assert_eq!(show(true, then, Some(|| text("no"))), text("yes"));
        assert_eq!(show(false, then, Some(|| text("no"))), text("no"));
        assert_eq!(show(false, then, None::<fn() -> Spec>), Spec::Null);
    }

    #[test]
    fn test_each_attaches_keys() {
        let items = vec!["a", "b", "c"];
        let spec = each(
            &items,
            |item| item.to_string(),
            |item, _key| element("li").child(text(*item)).into(),
        );

        let keys: Vec<_> = spec.items.iter().map(|s| s.key().cloned()).collect();
        assert_eq!(
            keys,
            vec![Some(Key::from("a")), Some(Key::from("b")), Some(Key::from("c"))]
        );
    }

    #[test]
    fn test_each_duplicate_key_is_rejected_by_check() {
        let items = vec!["a", "a", "b"];
        let spec = each(&items, |item| *item, |item, _| text(*item));
        assert!(Spec::from(spec).check_keys().is_err());
    }

    #[test]
    fn test_each_empty_list() {
        let items: Vec<&str> = vec![];
        let spec = each(&items, |item| *item, |item, _| text(*item));
        assert!(spec.items.is_empty());
    }
}
