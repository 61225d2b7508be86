use medproto_core::error::CoreError;
use medproto_core::models::protocol::{ProtocolFullContent, ProtocolSection};
use medproto_core::sections::{self, ContentShape};
use serde_json::json;

#[test]
fn parses_well_formed_sections() {
    let content = ProtocolFullContent::from_value(json!({
        "1": { "sectionNumber": 1, "title": "Identificação", "content": { "versao": "1.0" } },
        "8": { "sectionNumber": 8, "title": "Complicações", "content": ["choque"] },
    }))
    .unwrap();

    assert_eq!(content.len(), 2);
    let first = content.section(1).unwrap();
    assert_eq!(first.section_number, Some(1));
    assert_eq!(first.title, "Identificação");
    assert_eq!(first.field("versao"), Some(&json!("1.0")));
    assert!(content.section(8).unwrap().content.is_array());
}

#[test]
fn malformed_sections_are_kept_without_a_number() {
    let content = ProtocolFullContent::from_value(json!({
        "2": "just a string",
        "3": { "sectionNumber": "three", "title": "Definição", "content": "texto" },
        "4": { "sectionNumber": 4.5, "title": "Critérios", "content": "texto" },
    }))
    .unwrap();

    assert_eq!(content.len(), 3);
    assert_eq!(content.get("2").unwrap().section_number, None);
    assert_eq!(content.get("3").unwrap().section_number, None);
    assert_eq!(content.get("3").unwrap().title, "Definição");
    assert_eq!(content.get("4").unwrap().section_number, None);
}

#[test]
fn float_section_numbers_with_no_fraction_are_accepted() {
    let content = ProtocolFullContent::from_json(
        r#"{"5": {"sectionNumber": 5.0, "title": "Avaliação", "content": "Se febre, medir temperatura."}}"#,
    )
    .unwrap();
    assert_eq!(content.section(5).unwrap().section_number, Some(5));
}

#[test]
fn non_object_root_is_rejected() {
    let err = ProtocolFullContent::from_value(json!([1, 2, 3])).unwrap_err();
    assert!(matches!(err, CoreError::InvalidContentRoot));

    let err = ProtocolFullContent::from_json("not json").unwrap_err();
    assert!(matches!(err, CoreError::Serialization(_)));
}

#[test]
fn has_content_treats_blank_values_as_empty() {
    let empty = [json!(null), json!(""), json!("   "), json!({}), json!([])];
    for value in empty {
        assert!(!ProtocolSection::new(1, "t", value.clone()).has_content(), "{value}");
    }
    let filled = [json!("x"), json!({"a": 1}), json!([0]), json!(0), json!(false)];
    for value in filled {
        assert!(ProtocolSection::new(1, "t", value.clone()).has_content(), "{value}");
    }
}

#[test]
fn content_text_is_string_or_compact_json() {
    let text = ProtocolSection::new(6, "Diagnóstico", json!("Hemograma completo"));
    assert_eq!(text.content_text(), "Hemograma completo");

    let object = ProtocolSection::new(6, "Diagnóstico", json!({"exames": ["ECG"]}));
    assert_eq!(object.content_text(), r#"{"exames":["ECG"]}"#);
}

#[test]
fn collecting_sections_keys_them_by_number() {
    let content: ProtocolFullContent = (1..=13)
        .map(|n| ProtocolSection::new(n, sections::title_for(n), json!("conteúdo")))
        .collect();

    assert_eq!(content.len(), 13);
    for n in 1..=13 {
        assert_eq!(content.get(&n.to_string()).unwrap().section_number, Some(n));
    }
}

#[test]
fn serializes_back_with_camel_case_keys() {
    let mut content = ProtocolFullContent::new();
    content.insert(ProtocolSection::new(2, "Ficha Técnica", json!({"autores": []})));

    let value = serde_json::to_value(&content).unwrap();
    assert_eq!(
        value,
        json!({"2": {"sectionNumber": 2, "title": "Ficha Técnica", "content": {"autores": []}}})
    );
}

#[test]
fn section_definitions_cover_all_thirteen_sections() {
    assert_eq!(sections::SECTION_DEFINITIONS.len(), sections::SECTION_COUNT as usize);
    for (idx, def) in sections::SECTION_DEFINITIONS.iter().enumerate() {
        assert_eq!(def.number as usize, idx + 1);
        assert!(!def.title.is_empty());
    }

    for n in [1, 2, 11, 12, 13] {
        assert_eq!(sections::definition(n).unwrap().shape, ContentShape::Object);
    }
    assert_eq!(sections::definition(8).unwrap().shape, ContentShape::Array);
    assert_eq!(sections::definition(7).unwrap().shape, ContentShape::Any);
    assert!(sections::definition(14).is_none());
    assert_eq!(sections::title_for(14), "Seção 14");
}

#[test]
fn content_shapes_match_json_values() {
    assert!(ContentShape::Object.matches(&json!({})));
    assert!(!ContentShape::Object.matches(&json!([])));
    assert!(ContentShape::Array.matches(&json!([])));
    assert!(!ContentShape::Array.matches(&json!("x")));
    assert!(ContentShape::Any.matches(&json!(null)));
    assert_eq!(sections::json_type_name(&json!([])), "array");
    assert_eq!(sections::json_type_name(&json!("x")), "string");
}
