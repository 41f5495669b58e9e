//! Script builders for the isolated automation world.
//!
//! Arguments are embedded as JSON literals, which are valid JavaScript string
//! literals, so selectors and values never need manual escaping.

use action_primitives::REF_ATTRIBUTE;

fn literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Tags every match with a reference attribute and returns element snapshots.
///
/// Elements tagged by an earlier query keep their reference.
pub fn query(selector: &str, scope: Option<&str>, prefix: &str) -> String {
    let scope = scope.map(literal).unwrap_or_else(|| "null".to_string());
    format!(
        r#"(() => {{
  const attr = {attr};
  const scopeSel = {scope};
  let root = document;
  if (scopeSel !== null) {{
    root = document.querySelector(scopeSel);
    if (!root) return {{ status: 'stale', elements: [] }};
  }}
  const nodes = Array.from(root.querySelectorAll({selector}));
  const elements = nodes.map((el, i) => {{
    let reference = el.getAttribute(attr);
    if (!reference) {{
      reference = {prefix} + '-' + i;
      el.setAttribute(attr, reference);
    }}
    const style = window.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    const visible = style.visibility !== 'hidden' && style.display !== 'none'
      && (rect.width > 0 || rect.height > 0);
    const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true'
      && !el.classList.contains('ui-state-disabled');
    return {{
      reference,
      text: (el.innerText !== undefined ? el.innerText : el.textContent) || '',
      value: 'value' in el ? String(el.value) : null,
      visible,
      enabled,
    }};
  }});
  return {{ status: 'ok', elements }};
}})()"#,
        attr = literal(REF_ATTRIBUTE),
        scope = scope,
        selector = literal(selector),
        prefix = literal(prefix),
    )
}

fn with_element(target: &str, body: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({target});
  if (!el || !el.isConnected) return {{ status: 'stale' }};
{body}
  return {{ status: 'ok' }};
}})()"#,
        target = literal(target),
        body = body,
    )
}

/// Full pointer gesture; the page's widgets react to mousedown, not click.
pub fn press(target: &str) -> String {
    with_element(
        target,
        r#"  el.scrollIntoView({ block: 'center' });
  for (const type of ['mousedown', 'mouseup', 'click']) {
    el.dispatchEvent(new MouseEvent(type, { bubbles: true, cancelable: true, view: window }));
  }"#,
    )
}

pub fn fill(target: &str, value: &str) -> String {
    let body = format!(
        r#"  el.focus();
  const proto = el instanceof HTMLTextAreaElement
    ? HTMLTextAreaElement.prototype
    : HTMLInputElement.prototype;
  const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
  setter.call(el, {value});
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new KeyboardEvent('keyup', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));"#,
        value = literal(value),
    );
    with_element(target, &body)
}

pub fn press_enter(target: &str) -> String {
    with_element(
        target,
        r#"  el.focus();
  for (const type of ['keydown', 'keypress', 'keyup']) {
    el.dispatchEvent(new KeyboardEvent(type, {
      key: 'Enter', code: 'Enter', keyCode: 13, which: 13, bubbles: true, cancelable: true,
    }));
  }"#,
    )
}

pub fn set_body_attribute(name: &str, value: &str) -> String {
    format!(
        "(() => {{ document.body.setAttribute({}, {}); return {{ status: 'ok' }}; }})()",
        literal(name),
        literal(value)
    )
}
