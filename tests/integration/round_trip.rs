//! Round-trip tests for the canonical printer
//!
//! Canonical output must compile back to the same schema, and formatting it
//! again must change nothing.

use proptest::prelude::*;
use wml::printer::PrintConfig;
use wml::schema::detached;

const ADVENTURE: &str = r#"
// The opening chapter
<Story key=(Chapter1) instance>
    <Import from=(Common)>
        <Use key=(lantern) />
        <Use key=(Forest) as=(Woods) />
    </Import>
    <Variable key=(lit) default={false} />
    <Computed key=(canSee) src={lit || lantern.on} />
    <Action key=(toggle) src={() => { lit = !lit }} />
    <Bookmark key=(weather)>A thin   rain falls.</Bookmark>
    <Room key=(Cottage)>
        <Name>Cottage</Name>
        <Description>
            A cramped cottage. <Bookmark key=(weather) />
            <If {canSee}> Shelves of jars line every wall, their labels faded past reading, and a
            <Link to=(lantern)>lantern</Link> hangs from a hook by the door. </If>
            <Else>It is too dark to see.</Else>
            <br />
            The door stands \<ajar\>.
        </Description>
        <Exit to=(Garden)>out</Exit>
        <If {lit}><Exit to=(Woods)>the woods</Exit></If>
    </Room>
    <Room key=(Garden)>
        <Name>Garden<Space />Path</Name>
        <Exit to=(Cottage) />
    </Room>
    <Exit from=(Woods) to=(Garden) />
    <Feature key=(jar)><Description>A jar of honey.</Description></Feature>
    <Character key=(Marta)>
        <Name>Marta</Name>
        <Pronouns subject="she" object="her" possessive="hers" adjective="her" reflexive="herself" />
        <FirstImpression>A stooped figure mending a net.</FirstImpression>
        <OneCoolThing>Knows every tide by heart.</OneCoolThing>
        <Outfit>Oilskin coat, patched twice.</Outfit>
        <Image key=(martaPortrait) fileURL="img/marta \"b\".png" />
    </Character>
    <Map key=(Overview)>
        <Name>Village</Name>
        <Room key=(Cottage) x="0" y="0" />
        <Room key=(Garden) x="1" y="-1" />
    </Map>
</Story>
"#;

#[test]
fn adventure_round_trips() {
    let original = wml::compile(ADVENTURE).unwrap();
    let printed = wml::format(ADVENTURE).unwrap();
    let reread = wml::compile(&printed).unwrap();
    assert_eq!(detached(&reread), detached(&original), "printed:\n{printed}");
}

#[test]
fn adventure_format_is_idempotent() {
    let once = wml::format(ADVENTURE).unwrap();
    let twice = wml::format(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn adventure_output_shape() {
    let printed = wml::format(ADVENTURE).unwrap();
    assert!(printed.starts_with("<Story key=(Chapter1) instance>\n"));
    assert!(printed.ends_with("\n</Story>"));
    assert!(!printed.contains("//"));
    assert!(printed.contains("    <Bookmark key=(weather)>A thin rain falls.</Bookmark>\n"));
    assert!(printed.contains("<Name>Garden<Space />Path</Name>"));
    assert!(printed.contains("<Exit from=(Woods) to=(Garden) />"));
    assert!(printed.contains(r#"fileURL="img/marta \"b\".png""#));
    assert!(printed.contains(r"The door stands \<ajar\>."));
    for line in printed.lines() {
        assert!(!line.ends_with(' '), "trailing space: {line:?}");
    }
}

#[test]
fn canonical_form_is_a_fixed_point() {
    let canonical = "<Asset key=(Test)><Room key=(VORTEX) /></Asset>";
    assert_eq!(wml::format(canonical).unwrap(), canonical);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any width and indent still round-trips.
    #[test]
    fn round_trips_under_any_config(
        max_width in 10usize..120,
        min_width in 5usize..40,
        indent_width in 0usize..8,
    ) {
        let config = PrintConfig::default()
            .with_max_width(max_width)
            .with_min_width(min_width)
            .with_indent_width(indent_width);
        let original = wml::compile(ADVENTURE).unwrap();
        let printed = wml::format_with_config(ADVENTURE, &config).unwrap();
        let reread = wml::compile(&printed).unwrap();
        prop_assert_eq!(detached(&reread), detached(&original), "printed:\n{}", printed);
        prop_assert_eq!(wml::format_with_config(&printed, &config).unwrap(), printed);
    }
}
