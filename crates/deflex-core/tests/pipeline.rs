use deflex_core::{
    BuildConfig, BuildStage, ConvertError, Direction, Role, SizeSpec, convert_json,
};
use pretty_assertions::assert_eq;

const HEADER_ROW: &str = include_str!("fixtures/header_row.json");
const CARD_LIST: &str = include_str!("fixtures/card_list.json");

fn stage(build_stage: BuildStage) -> BuildConfig {
    BuildConfig {
        build_stage,
        ..BuildConfig::default()
    }
}

#[test]
fn page_with_header_and_two_blocks() {
    let conversion = convert_json(HEADER_ROW, &BuildConfig::default()).unwrap();
    let tree = &conversion.tree;
    let root = &tree[tree.root];

    assert!(root.role.contains(Role::Page));
    assert_eq!(root.width_spec, Some(SizeSpec::Constrained));
    assert_eq!(root.height_spec, Some(SizeSpec::Auto));

    let header = tree.find("nav").unwrap();
    assert_eq!(tree.attach_nodes(tree.root), vec![header]);
    assert!(tree[header].role.contains(Role::Header));
    assert!(tree[header].class_list.contains("fixed"));

    let left = tree.find("left").unwrap();
    let right = tree.find("right").unwrap();
    assert_eq!(root.direction, Some(Direction::Row));
    assert_eq!(tree.children(tree.root), vec![left, right]);
    assert!(root.class_list.contains("gap-x-[20px]"));
    assert!(root.class_list.contains("justify-start"));
    for idx in [left, right] {
        assert!(!tree[idx].class_list.contains("absolute"));
        assert!(tree[idx].class_list.contains("w-[100px]"));
        assert!(tree[idx].class_list.contains("h-[50px]"));
    }
}

#[test]
fn pre_stage_keeps_the_raw_tree() {
    let conversion = convert_json(HEADER_ROW, &stage(BuildStage::Pre)).unwrap();
    let tree = &conversion.tree;
    assert_eq!(tree[tree.root].direction, None);
    assert_eq!(tree.children(tree.root).len(), 2);
    let left = tree.find("left").unwrap();
    assert_eq!(tree[left].width_spec, None);
}

#[test]
fn tree_stage_stops_before_measuring() {
    let conversion = convert_json(HEADER_ROW, &stage(BuildStage::Tree)).unwrap();
    let tree = &conversion.tree;
    assert_eq!(tree[tree.root].direction, Some(Direction::Row));
    assert!(!tree[tree.root].class_list.contains("gap-x-[20px]"));
    let left = tree.find("left").unwrap();
    assert_eq!(tree[left].width_spec, None);
}

#[test]
fn equal_cards_become_one_list() {
    let conversion = convert_json(CARD_LIST, &BuildConfig::default()).unwrap();
    let tree = &conversion.tree;
    let group = tree.find("cards").unwrap();
    let children = tree.children(group);
    assert_eq!(children.len(), 1);
    let list = children[0];
    assert!(tree[list].role.contains(Role::ListY));

    let expected: Vec<_> = ["card-1", "card-2", "card-3", "card-4"]
        .iter()
        .map(|id| tree.find(id).unwrap())
        .collect();
    assert_eq!(tree.children(list), expected);
    for &item in &expected {
        assert!(tree[item].role.contains(Role::ListItem));
    }
    assert!(tree[list].class_list.contains("gap-y-[16px]"));
    assert!(conversion.diagnostics.iter().any(|d| d.rule == "list"));
}

#[test]
fn ghost_group_is_unwrapped() {
    let config = BuildConfig {
        remove_ghost_nodes: true,
        ..BuildConfig::default()
    };
    let conversion = convert_json(CARD_LIST, &config).unwrap();
    let tree = &conversion.tree;
    assert!(tree.find("cards").is_none());
    let children = tree.children(tree.root);
    assert_eq!(children.len(), 1);
    assert!(tree[children[0]].role.contains(Role::ListY));
}

#[test]
fn output_is_renderer_facing() {
    let conversion = convert_json(HEADER_ROW, &BuildConfig::default()).unwrap();
    let json = serde_json::to_value(conversion.output()).unwrap();
    assert_eq!(json["tagName"], "div");
    assert_eq!(json["id"], "home");
    assert_eq!(json["role"][0], "page");
    assert_eq!(json["children"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["attachNodes"][0]["role"][0], "header");
    assert!(json.get("bounds").is_none());

    let outline = conversion.outline();
    assert!(outline.starts_with("div#home (page) row CA"), "{outline}");
    assert!(outline.contains("\n  @div#nav (header)"), "{outline}");
}

#[test]
fn rejects_non_artboard_root() {
    let input = r#"{
        "size": { "width": 100, "height": 100 },
        "layers": {
            "basic": { "id": "g", "type": "group" },
            "bounds": { "left": 0, "top": 0, "width": 100, "height": 100 }
        }
    }"#;
    let err = convert_json(input, &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidRoot { ref found } if found == "group"));
}

#[test]
fn rejects_malformed_json() {
    let err = convert_json("{ \"size\": ", &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Parse(_)));
}
