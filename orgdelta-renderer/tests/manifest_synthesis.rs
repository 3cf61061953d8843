use orgdelta_core::{ChangeRecord, ChangeStatus, FolderTypeTable};
use orgdelta_renderer::{synthesize, TypeMemberMap};
use rstest::rstest;

fn record(path: &str, status: ChangeStatus) -> ChangeRecord {
    ChangeRecord {
        path: path.to_string(),
        status,
        source_content: format!("source of {path}"),
        target_content: String::new(),
    }
}

fn table() -> FolderTypeTable {
    FolderTypeTable::default()
}

#[test]
fn empty_selection_yields_version_only() {
    let out = synthesize(&[], &table(), "58.0").expect("synthesize");
    assert!(!out.contains("<types>"), "no type blocks expected:\n{out}");
    assert!(out.contains("<version>58.0</version>"));
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(out.ends_with("</Package>"));
}

#[test]
fn two_classes_share_one_block_in_first_seen_order() {
    let selected = vec![
        record("unpackaged/classes/Foo.cls", ChangeStatus::New),
        record("unpackaged/classes/Bar.cls", ChangeStatus::Modified),
    ];
    let out = synthesize(&selected, &table(), "58.0").expect("synthesize");

    assert_eq!(out.matches("<types>").count(), 1);
    assert_eq!(out.matches("<name>ApexClass</name>").count(), 1);
    let foo = out.find("<members>Foo</members>").expect("Foo member");
    let bar = out.find("<members>Bar</members>").expect("Bar member");
    assert!(foo < bar, "Foo must precede Bar:\n{out}");
}

#[test]
fn blocks_follow_first_encounter_of_type() {
    let selected = vec![
        record("unpackaged/triggers/OppTrigger.trigger", ChangeStatus::New),
        record("unpackaged/classes/Foo.cls", ChangeStatus::New),
        record("unpackaged/triggers/AccTrigger.trigger", ChangeStatus::New),
    ];
    let out = synthesize(&selected, &table(), "58.0").expect("synthesize");

    let trigger = out.find("<name>ApexTrigger</name>").expect("trigger block");
    let class = out.find("<name>ApexClass</name>").expect("class block");
    assert!(trigger < class);
    let opp = out.find("<members>OppTrigger</members>").expect("opp");
    let acc = out.find("<members>AccTrigger</members>").expect("acc");
    assert!(opp < acc);
}

#[test]
fn synthesis_is_stable_under_duplicated_selection() {
    let once = vec![
        record("unpackaged/classes/Foo.cls", ChangeStatus::New),
        record("unpackaged/objects/Opp.object", ChangeStatus::Modified),
        record("unpackaged/classes/Bar.cls", ChangeStatus::New),
    ];
    let mut twice = once.clone();
    twice.extend(once.clone());

    let a = synthesize(&once, &table(), "58.0").expect("first");
    let b = synthesize(&once, &table(), "58.0").expect("second");
    let c = synthesize(&twice, &table(), "58.0").expect("duplicated");
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn shallow_paths_are_silently_excluded() {
    let selected = vec![
        record("unpackaged/package.xml", ChangeStatus::Modified),
        record("unpackaged/classes/Foo.cls", ChangeStatus::New),
    ];
    let out = synthesize(&selected, &table(), "58.0").expect("synthesize");
    assert_eq!(out.matches("<types>").count(), 1);
    assert!(out.contains("<members>Foo</members>"));
}

#[rstest]
#[case("unpackaged/objects/Opportunity.object", "CustomObject", "Opportunity")]
#[case("unpackaged/flows/Onboard.flow-meta.xml", "flows", "Onboard")]
#[case("unpackaged/aura/myCmp/myCmp.cmp", "AuraDefinitionBundle", "myCmp/myCmp")]
fn classification_per_folder(#[case] path: &str, #[case] ty: &str, #[case] member: &str) {
    let map = TypeMemberMap::from_records(&[record(path, ChangeStatus::New)], &table());
    let members = map.members(ty).expect("type present");
    assert!(members.contains(member), "members of {ty}: {members:?}");
}

#[test]
fn version_tag_is_configurable() {
    let out = synthesize(&[], &table(), "61.0").expect("synthesize");
    assert!(out.contains("<version>61.0</version>"));
}
