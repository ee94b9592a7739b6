//! End-to-end passes over plain elements, text, lists and foreign content.

use spark_vdom::{
    Config, Document, NodeFlags, NodeId, Spec, Vdom, VdomError, each, element, inline, list, raw,
    show, text,
};
use test_case::test_case;

fn setup() -> (Vdom, NodeId) {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    (Vdom::new(doc), container)
}

fn items(keys: &[i32]) -> Spec {
    element("ul")
        .child(each(keys, |k| *k, |k, _| element("li").child(text(k.to_string())).into()))
        .into()
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn test_render_element_with_texts() {
    let (mut vdom, container) = setup();

    let nodes = vdom
        .render(container, element("div").child(text("a")).child(text("b")))
        .unwrap();

    let doc = vdom.document();
    assert_eq!(doc.inner_markup(container), "<div>ab</div>");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.tag(nodes[0]), Some("div"));
    assert!(vdom.node_flags(nodes[0]).contains(NodeFlags::CREATED | NodeFlags::OWNED));
}

#[test]
fn test_swapped_texts_rewrite_in_place() {
    let (mut vdom, container) = setup();
    vdom.render(container, element("div").child(text("a")).child(text("b")))
        .unwrap();
    vdom.document_mut().reset_stats();

    vdom.render(container, element("div").child(text("b")).child(text("a")))
        .unwrap();

    let stats = vdom.document().stats();
    assert_eq!(vdom.document().inner_markup(container), "<div>ba</div>");
    assert_eq!(stats.structural(), 0);
    assert_eq!(stats.texts, 2);
}

#[test]
fn test_identical_render_is_free() {
    let (mut vdom, container) = setup();
    let spec: Spec = element("section")
        .attr("class", "card")
        .child(element("h1").child(text("Title")))
        .child(list(["one", "two"]))
        .into();

    vdom.render(container, spec.clone()).unwrap();
    vdom.document_mut().reset_stats();
    vdom.render(container, spec).unwrap();

    assert_eq!(vdom.document().stats().total(), 0);
}

#[test]
fn test_render_returns_top_level_nodes() {
    let (mut vdom, container) = setup();
    let nodes = vdom
        .render(container, list([element("p").into(), text("x"), Spec::Null]))
        .unwrap();

    assert_eq!(nodes, vdom.document().children(container).to_vec());
    assert_eq!(nodes.len(), 2);
}

// =============================================================================
// Keyed Lists
// =============================================================================

#[test]
fn test_keyed_swap_keeps_nodes() {
    let (mut vdom, container) = setup();
    vdom.render(container, items(&[1, 2])).unwrap();
    let ul = vdom.document().children(container)[0];
    let before = vdom.document().children(ul).to_vec();
    vdom.document_mut().reset_stats();

    vdom.render(container, items(&[2, 1])).unwrap();

    let doc = vdom.document();
    assert_eq!(doc.inner_markup(container), "<ul><li>2</li><li>1</li></ul>");
    assert_eq!(doc.children(ul), &[before[1], before[0]]);
    assert_eq!(doc.stats().created, 0);
    assert_eq!(doc.stats().removed, 0);
    assert_eq!(doc.stats().texts, 0);
}

#[test]
fn test_keyed_insert_and_remove() {
    let (mut vdom, container) = setup();
    vdom.render(container, items(&[1, 2, 3])).unwrap();
    let ul = vdom.document().children(container)[0];
    let three = vdom.document().children(ul)[2];

    vdom.render(container, items(&[3, 4])).unwrap();

    let doc = vdom.document();
    assert_eq!(doc.inner_markup(container), "<ul><li>3</li><li>4</li></ul>");
    assert_eq!(doc.children(ul)[0], three);
}

#[test]
fn test_duplicate_key_fails_before_mutation() {
    let (mut vdom, container) = setup();
    vdom.render(container, element("p")).unwrap();
    vdom.document_mut().reset_stats();

    let spec = element("ul")
        .child(element("li").key("x"))
        .child(element("li").key("x"));
    let result = vdom.render(container, spec);

    assert_eq!(result, Err(VdomError::DuplicateKey { key: "x".into() }));
    assert_eq!(vdom.document().stats().total(), 0);
    assert_eq!(vdom.document().inner_markup(container), "<p></p>");
}

// =============================================================================
// Attributes
// =============================================================================

#[test_case("x".into(), "<div a=\"x\"></div>" ; "text value")]
#[test_case(true.into(), "<div a=\"\"></div>" ; "true is empty")]
#[test_case(false.into(), "<div></div>" ; "false is absent")]
#[test_case(1.5.into(), "<div a=\"1.5\"></div>" ; "fraction")]
#[test_case(3.into(), "<div a=\"3\"></div>" ; "integer")]
fn test_attribute_values(value: spark_vdom::AttrValue, expected: &str) {
    let (mut vdom, container) = setup();
    vdom.render(container, element("div").attr("a", value)).unwrap();
    assert_eq!(vdom.document().inner_markup(container), expected);
}

#[test]
fn test_attribute_diff() {
    let (mut vdom, container) = setup();
    vdom.render(container, element("div").attr("a", "1").attr("b", "2"))
        .unwrap();
    vdom.document_mut().reset_stats();

    vdom.render(container, element("div").attr("a", "1").attr("c", "3"))
        .unwrap();

    assert_eq!(
        vdom.document().inner_markup(container),
        "<div a=\"1\" c=\"3\"></div>"
    );
    assert_eq!(vdom.document().stats().attributes, 2);
}

#[test]
fn test_element_hooks() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let (mut vdom, container) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let spec = |log: &Rc<RefCell<Vec<&'static str>>>| {
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        element("div")
            .on_create(move |_, _| a.borrow_mut().push("create"))
            .on_update(move |_, _| b.borrow_mut().push("update"))
            .on_render(move |_, _| c.borrow_mut().push("render"))
            .on_remove(move |_, _| d.borrow_mut().push("remove"))
    };

    vdom.render(container, spec(&log)).unwrap();
    vdom.render(container, spec(&log)).unwrap();
    vdom.render(container, text("gone")).unwrap();

    assert_eq!(
        *log.borrow(),
        ["create", "render", "update", "render", "remove"]
    );
    assert_eq!(vdom.document().inner_markup(container), "gone");
}

#[test]
fn test_hooks_are_not_attributes() {
    let (mut vdom, container) = setup();
    vdom.render(container, element("div").on_create(|doc, node| doc.set_attribute(node, "ready", "")))
        .unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div ready=\"\"></div>");
}

// =============================================================================
// Foreign Content
// =============================================================================

fn prefilled(config: Config) -> (Vdom, NodeId, NodeId) {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let div = doc.create_element("div");
    let span = doc.create_element("span");
    let keep = doc.create_text("keep");
    let stray = doc.create_element("b");
    doc.append_child(container, div);
    doc.append_child(div, span);
    doc.append_child(span, keep);
    doc.append_child(div, stray);
    (Vdom::with_config(doc, config), container, div)
}

#[test]
fn test_adopts_foreign_span() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let span = doc.create_element("span");
    let old = doc.create_text("old");
    doc.append_child(container, span);
    doc.append_child(span, old);
    let mut vdom = Vdom::new(doc);

    let nodes = vdom
        .render(container, element("span").child(text("new")))
        .unwrap();

    let doc = vdom.document();
    assert_eq!(nodes, [span]);
    assert_eq!(doc.children(span), &[old]);
    assert_eq!(doc.inner_markup(container), "<span>new</span>");
    assert!(!vdom.node_flags(span).contains(NodeFlags::CREATED));
    assert!(vdom.node_flags(span).contains(NodeFlags::OWNED | NodeFlags::REFINED));

    vdom.document_mut().reset_stats();
    vdom.render(container, element("span").child(text("newer")))
        .unwrap();
    let doc = vdom.document();
    assert_eq!(doc.children(span), &[old]);
    assert_eq!(doc.text(old), Some("newer"));
    assert_eq!(doc.stats().structural(), 0);
}

#[test]
fn test_show_toggles_branch() {
    let (mut vdom, container) = setup();
    let spec = |on: bool| {
        element("div").child(show(
            on,
            || element("b").into(),
            Some(|| text("off")),
        ))
    };

    vdom.render(container, spec(true)).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div><b></b></div>");
    vdom.render(container, spec(false)).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div>off</div>");
}

#[test]
fn test_refinement_prunes_stray_children() {
    let (mut vdom, container, div) = prefilled(Config::default());
    vdom.render(container, element("div").child(element("span").child(text("keep"))))
        .unwrap();

    assert_eq!(vdom.document().children(container), &[div]);
    assert_eq!(
        vdom.document().inner_markup(container),
        "<div><span>keep</span></div>"
    );
}

#[test]
fn test_prune_foreign_off_keeps_strays() {
    let config = Config {
        prune_foreign: false,
        ..Config::default()
    };
    let (mut vdom, container, _) = prefilled(config);
    vdom.render(container, element("div").child(element("span").child(text("keep"))))
        .unwrap();

    assert_eq!(
        vdom.document().inner_markup(container),
        "<div><span>keep</span><b></b></div>"
    );
}

#[test]
fn test_adopt_existing_off_creates_fresh_nodes() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let foreign = doc.create_element("p");
    let x = doc.create_text("x");
    doc.append_child(container, foreign);
    doc.append_child(foreign, x);
    let mut vdom = Vdom::with_config(doc, Config::fresh());

    let nodes = vdom.render(container, element("p")).unwrap();

    assert_ne!(nodes, [foreign]);
    assert_eq!(vdom.document().inner_markup(container), "<p></p><p>x</p>");
}

#[test]
fn test_wrong_kind_foreign_node_is_dropped() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let span = doc.create_element("span");
    doc.append_child(container, span);
    let mut vdom = Vdom::new(doc);

    vdom.render(container, element("div")).unwrap();

    assert_eq!(vdom.document().inner_markup(container), "<div></div>");
    assert_eq!(vdom.document().parent(span), None);
}

// =============================================================================
// Raw Nodes and Inline Functions
// =============================================================================

#[test]
fn test_raw_node_is_inserted_and_removed() {
    let (mut vdom, container) = setup();
    let badge = vdom.document_mut().create_element("em");

    vdom.render(container, element("div").child(text("a")).child(raw(badge)))
        .unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div>a<em></em></div>");
    assert!(vdom.node_flags(badge).contains(NodeFlags::RAW | NodeFlags::OWNED));

    vdom.render(container, element("div").child(text("a"))).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div>a</div>");
    assert_eq!(vdom.document().parent(badge), None);
}

#[test]
fn test_raw_node_must_exist() {
    let (mut vdom, container) = setup();
    let mut other = Document::new();
    for _ in 0..8 {
        other.create_text("pad");
    }
    let missing = other.create_text("elsewhere");

    let result = vdom.render(container, raw(missing));
    assert!(matches!(result, Err(VdomError::InvalidSpec { .. })));
}

#[test]
fn test_inline_sees_previous_nodes() {
    let (mut vdom, container) = setup();
    let spec = || {
        element("div").child(inline(|ctx| {
            let label = format!("{} {}", ctx.nodes.len(), ctx.parent.is_some());
            text(label)
        }))
    };

    vdom.render(container, spec()).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div>0 true</div>");

    vdom.render(container, spec()).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<div>1 true</div>");
}

// =============================================================================
// Sync and Unmount
// =============================================================================

#[test]
fn test_sync_patches_node_in_place() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let before = doc.create_text("before");
    let p = doc.create_element("p");
    let old = doc.create_text("old");
    doc.append_child(container, before);
    doc.append_child(container, p);
    doc.append_child(p, old);
    let mut vdom = Vdom::new(doc);

    let node = vdom
        .sync(p, element("p").attr("id", "x").child(text("new")))
        .unwrap();

    assert_eq!(node, p);
    assert_eq!(
        vdom.document().inner_markup(container),
        "before<p id=\"x\">new</p>"
    );

    vdom.sync(p, element("p").child(text("newer"))).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "before<p>newer</p>");
}

#[test]
fn test_sync_mismatch() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let p = doc.create_element("p");
    doc.append_child(container, p);
    let mut vdom = Vdom::new(doc);

    let result = vdom.sync(p, element("div"));
    assert!(matches!(
        result,
        Err(VdomError::SyncMismatch { expected, .. }) if expected == p
    ));
}

#[test]
fn test_sync_leaves_target_siblings_alone() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let a = doc.create_element("a");
    let div = doc.create_element("div");
    let ho = doc.create_text("ho");
    let b = doc.create_element("b");
    doc.append_child(container, a);
    doc.append_child(container, div);
    doc.append_child(div, ho);
    doc.append_child(container, b);
    let mut vdom = Vdom::new(doc);

    let result = vdom.sync(div, element("span"));

    assert!(matches!(result, Err(VdomError::SyncMismatch { .. })));
    assert_eq!(
        vdom.document().inner_markup(container),
        "<a></a><span></span><div>ho</div><b></b>"
    );
}

#[test]
fn test_failed_sync_releases_its_tree() {
    let mut doc = Document::new();
    let container = doc.create_element("body");
    let p = doc.create_element("p");
    doc.append_child(container, p);
    let mut vdom = Vdom::new(doc);

    vdom.sync(p, element("p").child(text("x"))).unwrap();
    let result = vdom.sync(p, element("p").children(vec![text("y"), element("").into()]));

    assert!(matches!(result, Err(VdomError::InvalidSpec { .. })));
    assert_eq!(vdom.vnode_count(), 0);

    vdom.sync(p, element("p").child(text("z"))).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<p>z</p>");
}

#[test]
fn test_render_into_text_fails() {
    let (mut vdom, _) = setup();
    let node = vdom.document_mut().create_text("t");
    assert!(matches!(
        vdom.render(node, element("p")),
        Err(VdomError::InvalidSpec { .. })
    ));
}

#[test]
fn test_empty_tag_fails() {
    let (mut vdom, container) = setup();
    assert!(matches!(
        vdom.render(container, element("")),
        Err(VdomError::InvalidSpec { .. })
    ));
}

#[test]
fn test_unmount_clears_everything() {
    let (mut vdom, container) = setup();
    vdom.render(container, items(&[1, 2, 3])).unwrap();
    assert!(vdom.vnode_count() > 0);

    vdom.unmount(container).unwrap();

    assert_eq!(vdom.document().inner_markup(container), "");
    assert_eq!(vdom.vnode_count(), 0);
    assert!(vdom.document().is_live(container));

    // A later render starts over
    vdom.render(container, items(&[1])).unwrap();
    assert_eq!(vdom.document().inner_markup(container), "<ul><li>1</li></ul>");
}
