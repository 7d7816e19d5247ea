//! Integration tests for canonical layout
//!
//! Tests how whole documents are laid out against the column budget.

use wml_language::parse_source;
use wml_printer::{Line, PrintConfig, layout, print, print_with_config};
use wml_schema::{SchemaNode, build_schema};

fn schema(source: &str) -> Vec<SchemaNode> {
    build_schema(&parse_source(source).unwrap()).unwrap()
}

fn format(source: &str) -> String {
    print(&schema(source))
}

// =============================================================================
// Single Line
// =============================================================================

#[test]
fn vortex_is_canonical() {
    let source = "<Asset key=(Test)><Room key=(VORTEX) /></Asset>";
    assert_eq!(format(source), source);
}

#[test]
fn open_close_pair_self_closes() {
    assert_eq!(
        format("<Asset key=(Test)>\n    <Room key=(VORTEX)></Room>\n</Asset>"),
        "<Asset key=(Test)><Room key=(VORTEX) /></Asset>"
    );
}

#[test]
fn hard_breaks_absorb_whitespace() {
    assert_eq!(
        format("<Asset key=(T)><Room key=(A)><Name>Old <Space /> hall</Name></Room></Asset>"),
        "<Asset key=(T)><Room key=(A)><Name>Old<Space />hall</Name></Room></Asset>"
    );
}

#[test]
fn empty_link_self_closes() {
    let source = "<Asset key=(T)><Room key=(A)><Description><Link to=(B) /></Description></Room></Asset>";
    assert_eq!(format(source), source);
}

#[test]
fn exit_inside_room_condition_uses_room() {
    let source = "<Asset key=(T)><Room key=(A)><If {open}><Exit to=(B) /></If></Room></Asset>";
    assert_eq!(format(source), source);
}

#[test]
fn exit_key_kept_when_not_synthetic() {
    let source = "<Asset key=(T)><Room key=(A)><Exit key=(hatch) to=(B) /></Room></Asset>";
    assert_eq!(format(source), source);
}

// =============================================================================
// Nesting
// =============================================================================

const LIBRARY: &str =
    "<Asset key=(T)><Import from=(lib)><Use key=(a) /><Use key=(b) as=(c) /></Import></Asset>";

#[test]
fn contents_nest_one_level() {
    assert_eq!(
        format(LIBRARY),
        "<Asset key=(T)>\n    <Import from=(lib)><Use key=(a) /><Use key=(b) as=(c) /></Import>\n</Asset>"
    );
}

#[test]
fn layout_reports_depths() {
    let lines = layout(&schema(LIBRARY), 0, &PrintConfig::default());
    let depths: Vec<_> = lines.iter().map(|line| line.depth).collect();
    assert_eq!(depths, vec![0, 1, 0]);
    assert_eq!(lines[2], Line::new(0, "</Asset>"));
}

#[test]
fn indent_width_is_configurable() {
    let config = PrintConfig::default().with_indent_width(2);
    assert_eq!(
        print_with_config(&schema(LIBRARY), &config),
        "<Asset key=(T)>\n  <Import from=(lib)><Use key=(a) /><Use key=(b) as=(c) /></Import>\n</Asset>"
    );
}

#[test]
fn description_wraps_inside_nested_tags() {
    let source = "<Asset key=(T)><Room key=(Hall)><Description>The great hall stretches north toward a \
                  line of tall windows, each one glazed with old and rippled glass that throws the \
                  light across the flagstones in bands.</Description></Room></Asset>";
    assert_eq!(
        format(source),
        "<Asset key=(T)>\n\
         \x20   <Room key=(Hall)>\n\
         \x20       <Description>\n\
         \x20           The great hall stretches north toward a line of tall windows, each\n\
         \x20           one glazed with old and rippled glass that throws the light across\n\
         \x20           the flagstones in bands.\n\
         \x20       </Description>\n\
         \x20   </Room>\n\
         </Asset>"
    );
}

#[test]
fn every_line_respects_budget() {
    let source = "<Asset key=(T)><Room key=(Hall)><Description>The great hall stretches north toward a \
                  line of tall windows, each one glazed with old and rippled glass that throws the \
                  light across the flagstones in bands.</Description><Exit to=(Gallery)>up the wide \
                  stone staircase</Exit></Room><Room key=(Gallery) /></Asset>";
    let config = PrintConfig::default();
    for line in layout(&schema(source), 0, &config) {
        assert!(
            line.width() <= config.budget(line.depth),
            "{line:?} exceeds {}",
            config.budget(line.depth)
        );
    }
}

#[test]
fn narrow_budget_nests_properties() {
    let config = PrintConfig::default().with_max_width(20).with_min_width(10);
    let source = "<Asset key=(V)><Variable key=(lantern) default={false} /></Asset>";
    assert_eq!(
        print_with_config(&schema(source), &config),
        "<Asset key=(V)>\n    <Variable\n        key=(lantern)\n        default={false}\n    />\n</Asset>"
    );
}
