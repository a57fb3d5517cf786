/// Entity reference resolution against a scene roster loaded from RON.

use stakeholder_narrative::core::config::ResolverConfig;
use stakeholder_narrative::core::resolver::EntityResolver;
use stakeholder_narrative::schema::entity::{Entity, Roster};
use stakeholder_narrative::schema::segment::{visible_text, TextSegment};

fn load_roster() -> Roster {
    Roster::load_from_ron(std::path::Path::new("tests/fixtures/roster.ron")).unwrap()
}

fn refs(segments: &[TextSegment]) -> Vec<(String, String)> {
    segments
        .iter()
        .filter_map(|s| {
            s.entity_id()
                .map(|id| (id.as_str().to_string(), s.text().to_string()))
        })
        .collect()
}

#[test]
fn fixture_roster_loads() {
    let roster = load_roster();
    assert_eq!(roster.len(), 5);
    let soto = roster.get_str("medico").unwrap();
    assert_eq!(soto.tooltip().role, "Jefe Médico");
    assert_eq!(roster.get_str("alcalde").unwrap().personality, "");
}

#[test]
fn round_trip_for_untagged_text() {
    let roster = load_roster();
    let resolver = EntityResolver::default();
    let texts = [
        "Ana Torres llegó antes que Ana Pérez.",
        "El Dr. Soto y la directora Rojas revisan el presupuesto.",
        "JOSÉ ÑÚÑEZ llamó; Nunez quiere respuestas hoy.",
        "Nadie mencionado aquí, salvo una banana.",
        "   ",
        "Marta",
    ];
    for text in texts {
        let segments = resolver.resolve(text, &roster);
        assert_eq!(visible_text(&segments), text, "round trip failed for {text:?}");
    }
}

#[test]
fn longest_match_precedence_across_entities() {
    let roster = load_roster();
    let segments = EntityResolver::default().resolve("Ana Torres llegó", &roster);
    assert_eq!(refs(&segments), vec![("gremio".to_string(), "Ana Torres".to_string())]);
}

#[test]
fn shared_first_name_goes_to_first_roster_entry() {
    let roster = load_roster();
    let segments = EntityResolver::default().resolve("Ana lo sabía", &roster);
    assert_eq!(refs(&segments), vec![("enfermera".to_string(), "Ana".to_string())]);
}

#[test]
fn accent_stripped_mentions_resolve() {
    let roster = load_roster();
    let segments = EntityResolver::default().resolve("Jose Nunez firmó", &roster);
    assert_eq!(refs(&segments), vec![("alcalde".to_string(), "Jose Nunez".to_string())]);
}

#[test]
fn honorific_title_is_not_a_mention() {
    let roster = Roster::new(vec![
        Entity::new("rivas", "Dr. Rivas", "Cirujano"),
        Entity::new("soto", "Dr. Soto", "Jefe Médico"),
    ]);
    let resolver = EntityResolver::default();

    let segments = resolver.resolve("Dr. Soto", &roster);
    assert_eq!(refs(&segments), vec![("soto".to_string(), "Dr. Soto".to_string())]);

    let segments = resolver.resolve("Habló el Dr. de turno", &roster);
    assert!(refs(&segments).is_empty());
}

#[test]
fn tags_disable_name_matching() {
    let roster = load_roster();
    let text = "Marta Rojas pidió que [[entity:medico|el doctor]] hable con Ana.";
    let segments = EntityResolver::default().resolve(text, &roster);
    assert_eq!(refs(&segments), vec![("medico".to_string(), "el doctor".to_string())]);
    assert_eq!(
        visible_text(&segments),
        "Marta Rojas pidió que el doctor hable con Ana."
    );
}

#[test]
fn spans_cover_tagged_source() {
    let roster = load_roster();
    let text = "[[entity:director]] y [[entity:nadie|Nadie]] discuten.";
    let segments = EntityResolver::default().resolve(text, &roster);
    let mut cursor = 0;
    for segment in &segments {
        assert_eq!(segment.span().start, cursor);
        cursor = segment.span().end;
    }
    assert_eq!(cursor, text.len());
    assert_eq!(visible_text(&segments), "Marta Rojas y Nadie discuten.");
}

#[test]
fn prebuilt_matcher_agrees_with_resolver() {
    let roster = load_roster();
    let resolver = EntityResolver::default();
    let matcher = resolver.matcher(&roster);
    for text in ["Soto y Rojas", "Pérez, Perez y PEREZ", ""] {
        assert_eq!(matcher.resolve(text), resolver.resolve(text, &roster));
    }
}

#[test]
fn stricter_token_length() {
    let roster = Roster::new(vec![Entity::new("a", "Ana Pérez", "Enfermera")]);
    let config = ResolverConfig {
        min_token_chars: 4,
        ..ResolverConfig::default()
    };
    let segments = EntityResolver::new(config).resolve("Ana y Pérez", &roster);
    assert_eq!(refs(&segments), vec![("a".to_string(), "Pérez".to_string())]);
}

#[test]
fn decomposed_accents_match_like_composed_ones() {
    let roster = Roster::new(vec![Entity::new("jp", "José Pérez", "tesorero")]);
    let resolver = EntityResolver::default();

    let composed = resolver.resolve("José llegó", &roster);
    assert_eq!(refs(&composed), vec![("jp".to_string(), "José".to_string())]);

    let text = "Jose\u{301} llego\u{301}";
    let segments = resolver.resolve(text, &roster);
    assert_eq!(refs(&segments), vec![("jp".to_string(), "Jose\u{301}".to_string())]);
    assert_eq!(visible_text(&segments), text);

    let segments = resolver.resolve("Pe\u{301}rez firmó", &roster);
    assert_eq!(refs(&segments), vec![("jp".to_string(), "Pe\u{301}rez".to_string())]);

    let text = "Hoy Jose\u{301} Pe\u{301}rez firma.";
    let segments = resolver.resolve(text, &roster);
    assert_eq!(
        refs(&segments),
        vec![("jp".to_string(), "Jose\u{301} Pe\u{301}rez".to_string())]
    );
    assert_eq!(segments[1].span().clone(), 4..text.find(" firma").unwrap());
}
