// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embed script rendering and configuration change detection.
//!
//! The served script carries the configuration inline plus a content hash of
//! the visually-relevant fields. The client compares that hash against its
//! cached copy: on mismatch it tears down any rendered widget DOM and
//! re-initializes; on match a module-level guard makes repeated script loads
//! idempotent. A 5-second poll re-fetches the served configuration and
//! forces a full page reload when the server-side hash moves.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::document::ConfigDocument;

/// Hash of the fields a storefront visitor can see.
///
/// Any successful save rewrites these fields, so the hash (and the embed
/// `ETag` derived from it) changes exactly when the rendered widget would.
pub fn config_hash(doc: &ConfigDocument) -> String {
    let visual = json!({
        "active": doc.is_active,
        "title": doc.title,
        "color": doc.color,
        "greeting": doc.greeting,
        "position": doc.position,
    });
    let digest = Sha256::digest(visual.to_string().as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Render the self-contained storefront script for one shop.
///
/// `base_url` is the public URL of this service (for the config poll and the
/// chat API); `shop` is the resolved tenant domain.
pub fn render_embed_script(doc: &ConfigDocument, shop: &str, base_url: &str) -> String {
    let hash = config_hash(doc);
    let config = serde_json::to_string(doc).unwrap_or_else(|_| "{}".to_string());
    let shop_json = serde_json::to_string(shop).unwrap_or_else(|_| "\"\"".to_string());
    let base_json = serde_json::to_string(base_url).unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"(function() {{
  'use strict';

  if (typeof window === 'undefined' || typeof document === 'undefined') return;

  var config = {config};
  var configHash = "{hash}";
  var shop = {shop_json};
  var apiBase = {base_json};

  // Configuration changed since the last load: tear the widget down and let
  // this load re-initialize it from scratch.
  var cachedHash = null;
  try {{ cachedHash = localStorage.getItem('parlorWidgetConfigHash'); }} catch (e) {{}}
  if (cachedHash !== configHash) {{
    var stale = document.getElementById('parlor-widget');
    var stalePanel = document.getElementById('parlor-panel');
    if (stale) stale.remove();
    if (stalePanel) stalePanel.remove();
    delete window.__parlorWidgetInit;
    try {{ localStorage.setItem('parlorWidgetConfigHash', configHash); }} catch (e) {{}}
  }}

  // Idempotence guard against repeated script loads.
  if (window.__parlorWidgetInit) return;
  window.__parlorWidgetInit = true;

  if (!config.isActive) return;

  function getSessionId() {{
    var id = null;
    try {{ id = localStorage.getItem('parlor-session-id'); }} catch (e) {{}}
    if (!id) {{
      id = 'session-' + Date.now() + '-' + Math.random().toString(36).slice(2, 11);
      try {{ localStorage.setItem('parlor-session-id', id); }} catch (e) {{}}
    }}
    return id;
  }}

  function addMessage(list, text, fromVisitor) {{
    var item = document.createElement('div');
    item.className = 'parlor-msg';
    item.style.cssText = 'margin:6px 0;padding:8px 12px;border-radius:14px;max-width:85%;' +
      (fromVisitor
        ? 'background:' + config.color + ';color:#fff;margin-left:auto;'
        : 'background:#f1f1f1;color:#222;');
    item.textContent = text;
    list.appendChild(item);
    list.scrollTop = list.scrollHeight;
  }}

  function sendMessage(list, input) {{
    var text = input.value.trim();
    if (!text) return;
    addMessage(list, text, true);
    input.value = '';
    fetch(apiBase + '/chat', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify({{ message: text, shop: shop, sessionId: getSessionId() }})
    }})
      .then(function(res) {{ return res.json(); }})
      .then(function(data) {{
        addMessage(list, data.reply ||
          "I'm sorry, I'm having trouble processing your request right now. Please try again later.");
      }})
      .catch(function() {{
        addMessage(list, "I'm sorry, I'm having trouble processing your request right now. Please try again later.");
      }});
  }}

  function createWidget() {{
    if (document.getElementById('parlor-widget')) return;

    var side = config.position === 'left' ? 'left' : 'right';

    var button = document.createElement('div');
    button.id = 'parlor-widget';
    button.style.cssText = 'position:fixed;bottom:20px;' + side + ':20px;width:56px;height:56px;' +
      'border-radius:50%;cursor:pointer;z-index:999999;display:flex;align-items:center;' +
      'justify-content:center;color:#fff;font-size:24px;box-shadow:0 4px 20px rgba(0,0,0,.15);' +
      'background:linear-gradient(135deg,' + config.startColor + ',' + config.endColor + ');';
    button.textContent = '💬';

    var panel = document.createElement('div');
    panel.id = 'parlor-panel';
    panel.style.cssText = 'position:fixed;bottom:90px;' + side + ':20px;width:320px;height:420px;' +
      'background:' + config.chatBgColor + ';border-radius:12px;z-index:999999;display:none;' +
      'flex-direction:column;overflow:hidden;box-shadow:0 10px 40px rgba(0,0,0,.25);' +
      'font-family:' + config.fontFamily + ';color:' + config.fontColor + ';';
    panel.innerHTML =
      '<div style="background:' + config.color + ';color:#fff;padding:12px 16px;font-weight:600;">' +
        config.title +
        '<div style="font-size:12px;font-weight:400;">' + config.agentName + ' · ' + config.agentRole + '</div>' +
      '</div>' +
      '<div id="parlor-msgs" style="flex:1;overflow-y:auto;padding:10px;"></div>' +
      '<div style="display:flex;gap:6px;padding:10px;border-top:1px solid #eee;">' +
        '<input id="parlor-input" style="flex:1;padding:8px 12px;border:1px solid #ddd;border-radius:18px;outline:none;">' +
        '<button id="parlor-send" style="padding:8px 14px;border:none;border-radius:18px;cursor:pointer;' +
          'background:' + config.color + ';color:#fff;">Send</button>' +
      '</div>';

    document.body.appendChild(button);
    document.body.appendChild(panel);

    var list = panel.querySelector('#parlor-msgs');
    var input = panel.querySelector('#parlor-input');
    addMessage(list, config.greeting);

    button.addEventListener('click', function() {{
      panel.style.display = panel.style.display === 'flex' ? 'none' : 'flex';
      if (panel.style.display === 'flex') input.focus();
    }});
    panel.querySelector('#parlor-send').addEventListener('click', function() {{
      sendMessage(list, input);
    }});
    input.addEventListener('keypress', function(e) {{
      if (e.key === 'Enter') sendMessage(list, input);
    }});

    if (config.openByDefault === '1') panel.style.display = 'flex';

    // Poll the served configuration; a hash move means a merchant edit, so
    // reload to pick up the new script wholesale.
    setInterval(function() {{
      fetch(apiBase + '/widget-config?shop=' + encodeURIComponent(shop))
        .then(function(res) {{ return res.json(); }})
        .then(function(data) {{
          if (data.configHash && data.configHash !== configHash) {{
            window.location.reload();
          }}
        }})
        .catch(function() {{}});
    }}, 5000);
  }}

  if (document.readyState === 'loading') {{
    document.addEventListener('DOMContentLoaded', createWidget);
  }} else {{
    createWidget();
  }}
}})();
"#
    )
}
