#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-chronicle-ui]";

/// CSS mặc định của trang niên biểu, có thể ghi đè qua các biến `--chronicle-*`.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --chronicle-font-family: "ZCOOL XiaoWei", "Noto Serif SC", serif;
  --chronicle-bg: #111111;
  --chronicle-surface: #1c1c1c;
  --chronicle-border: #444444;
  --chronicle-text: #ffffff;
  --chronicle-muted: #a0a0a0;
  --chronicle-accent: #00bc8c;
  --chronicle-radius: 6px;
}

.chronicle-root {
  font-family: var(--chronicle-font-family);
  background: var(--chronicle-bg);
  color: var(--chronicle-text);
  padding: 20px;
  display: flex;
  flex-direction: column;
  gap: 20px;
}

.chronicle-header {
  text-align: center;
  border-bottom: 1px solid var(--chronicle-border);
  padding-bottom: 16px;
}

.chronicle-header h1 {
  color: var(--chronicle-accent);
  font-size: 2.6rem;
  margin: 0 0 8px;
}

.chronicle-controls {
  background: var(--chronicle-surface);
  border-radius: var(--chronicle-radius);
  padding: 16px;
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
  gap: 16px;
}

.chronicle-control {
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.chronicle-control label {
  color: var(--chronicle-muted);
  font-size: 0.9rem;
}

.chronicle-control input[type="search"],
.chronicle-control select {
  padding: 6px 10px;
  border-radius: var(--chronicle-radius);
  border: 1px solid var(--chronicle-border);
  background: #f8f9fa;
  color: #000000;
}

.chronicle-range-labels {
  display: flex;
  justify-content: space-between;
  font-size: 0.85rem;
}

.chronicle-toggles {
  display: flex;
  gap: 12px;
  flex-wrap: wrap;
}

.chronicle-summary {
  color: var(--chronicle-muted);
  font-size: 0.85rem;
}

.chronicle-panel {
  background: var(--chronicle-bg);
  border: 1px solid var(--chronicle-border);
  border-radius: var(--chronicle-radius);
  padding: 10px;
}

.chronicle-panel[hidden] {
  display: none;
}

.chronicle-detail {
  background: var(--chronicle-surface);
  border-radius: var(--chronicle-radius);
  padding: 16px;
  min-height: 160px;
}

.chronicle-detail h3 {
  color: var(--chronicle-accent);
  border-bottom: 1px solid var(--chronicle-text);
  padding-bottom: 8px;
}

.chronicle-detail img {
  max-width: 100%;
  max-height: 300px;
  border-radius: var(--chronicle-radius);
  margin-bottom: 12px;
}

.chronicle-detail .chronicle-dynasty-line {
  font-style: italic;
}

button.chronicle-reset {
  align-self: flex-end;
  padding: 6px 14px;
  border-radius: var(--chronicle-radius);
  border: 1px solid var(--chronicle-accent);
  background: transparent;
  color: var(--chronicle-accent);
  cursor: pointer;
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-chronicle-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
