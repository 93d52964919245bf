use scalecheck_core::{ItemLegend, NumericTable};

#[test]
fn legend_round_trips_through_json() {
    let table = NumericTable::from_columns([
        ("I enjoy my work", vec![4.0, 5.0, 3.0]),
        ("I feel valued", vec![3.0, 5.0, 2.0]),
    ])
    .expect("valid table");

    let legend = table.legend();
    let json = serde_json::to_value(&legend).expect("serialize legend");

    assert_eq!(json["entries"][0]["label"], "Item 1");
    assert_eq!(json["entries"][1]["source_name"], "I feel valued");

    let parsed: ItemLegend = serde_json::from_value(json).expect("parse legend");
    assert_eq!(parsed, legend);
}
