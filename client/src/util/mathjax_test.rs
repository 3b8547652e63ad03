use super::*;

#[test]
fn describe_reports_each_outcome() {
    assert_eq!(describe(&Typeset::Done), "MathJax typesetting complete");
    assert_eq!(describe(&Typeset::Unavailable), "MathJax not available for typesetting");
    assert_eq!(
        describe(&Typeset::Failed("bad TeX".to_owned())),
        "MathJax typesetting failed: bad TeX"
    );
}

#[test]
fn result_regions_are_distinct() {
    let mut ids = RESULT_REGION_IDS.to_vec();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), RESULT_REGION_IDS.len());
}
