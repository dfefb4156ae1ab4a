use crate::{write_flow, FlowFormat};
use engine::scan_file;
use loader::Catalog;

fn render(fmt: FlowFormat) -> String {
    let text = "const x = req.body.name;\ndb.query(`SELECT * FROM t WHERE id = ${x}`);\n";
    let flow = scan_file("api.js", text, Catalog::builtin()).flow;
    let mut buf = Vec::new();
    write_flow(&mut buf, &flow, fmt).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn text_flow_lists_paths() {
    let rendered = render(FlowFormat::Text);
    assert!(rendered.contains("2 nodes, 1 edges"));
    assert!(rendered.contains("source-0 → sink-1"));
}

#[test]
fn dot_and_mermaid_exports() {
    let dot = render(FlowFormat::Dot);
    assert!(dot.starts_with("digraph DataFlow {"));
    assert!(dot.contains("\"source-0\" -> \"sink-1\" [label=\"Unsanitized\"];"));
    let mermaid = render(FlowFormat::Mermaid);
    assert!(mermaid.contains("source_0 -->|Unsanitized| sink_1"));
}

#[test]
fn json_flow_round_trips() {
    let flow: ir::DataFlow = serde_json::from_str(&render(FlowFormat::Json)).unwrap();
    assert_eq!(flow.tainted_paths.len(), 1);
}

#[test]
fn empty_flow_text() {
    let flow = ir::DataFlow::default();
    let mut buf = Vec::new();
    write_flow(&mut buf, &flow, FlowFormat::Text).unwrap();
    assert!(String::from_utf8(buf).unwrap().contains("No sources"));
}
