use super::counting::perspective_counts;
use super::filter::CorpusView;
use super::payload::{NetworkLink, NetworkNode, NetworkPayload, Visualization};

const MAX_NODES: usize = 20;
const MAX_GROUPS: usize = 5;
const MAX_PER_GROUP: usize = 5;

/// Creators as nodes, linked when they share a perspective.
pub fn generate(view: &CorpusView<'_>) -> Result<Visualization, String> {
    if view.creators.is_empty() {
        return Err("No hay datos de cuentas disponibles para generar la red".to_string());
    }

    let nodes: Vec<NetworkNode> = view
        .creators
        .iter()
        .take(MAX_NODES)
        .map(|c| NetworkNode {
            id: c.username.clone(),
            label: c.username.clone(),
            group: c.perspective.as_str().to_string(),
            size: c.followers / 10_000,
            color: c.perspective.color().to_string(),
        })
        .collect();

    let mut links = Vec::new();
    for group in perspective_counts(&view.creators).into_iter().take(MAX_GROUPS) {
        let members: Vec<&str> = view
            .creators
            .iter()
            .filter(|c| c.perspective.as_str() == group.name)
            .take(MAX_PER_GROUP)
            .map(|c| c.username.as_str())
            .collect();
        for (i, source) in members.iter().enumerate() {
            for target in &members[i + 1..] {
                links.push(NetworkLink {
                    source: source.to_string(),
                    target: target.to_string(),
                    strength: 1,
                    label: format!("Misma perspectiva: {}", group.name),
                });
            }
        }
    }

    let summary = format!(
        "Red de {} usuarios con {} conexiones basadas en perspectivas políticas",
        nodes.len(),
        links.len()
    );

    Ok(Visualization::Network(NetworkPayload {
        title: "Red de Usuarios y Conexiones".to_string(),
        nodes,
        links,
        summary,
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Creator, Perspective};

    #[test]
    fn test_links_within_perspective() {
        let creator = |name: &str, perspective| Creator {
            username: name.into(),
            perspective,
            followers_text: "25000".into(),
            followers: 25_000,
            age: None,
            themes: String::new(),
        };
        let creators = vec![
            creator("a", Perspective::Derecha),
            creator("b", Perspective::Derecha),
            creator("c", Perspective::Derecha),
            creator("d", Perspective::Izquierda),
        ];
        let view = CorpusView {
            creators: creators.iter().collect(),
            ..Default::default()
        };

        let Visualization::Network(payload) = generate(&view).unwrap() else {
            panic!("expected network");
        };
        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(payload.nodes[0].size, 2);
        assert_eq!(payload.nodes[3].color, "#ef4444");
        assert_eq!(payload.links.len(), 3);
        assert!(payload.links.iter().all(|l| l.label == "Misma perspectiva: derecha"));
    }
}
