use serde::Serialize;

use super::{Listing, OutputError, ViewMode};
use crate::store::Record;

#[derive(Serialize)]
struct InitialState<'a> {
    term: &'a str,
    categories: Vec<&'a str>,
    countries: Vec<&'a str>,
    page: usize,
    page_size: usize,
    view: ViewMode,
    search_fields: Vec<&'static str>,
}

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

/// A self-contained page embedding every record; the script applies the
/// same search, category/country and pagination rules as the library,
/// starting from the listing's query and page.
pub fn render_html(all: &[Record], listing: &Listing<'_>) -> Result<Vec<u8>, OutputError> {
    let state = InitialState {
        term: listing.query.term.as_str(),
        categories: listing.query.categories.iter().map(String::as_str).collect(),
        countries: listing.query.countries.iter().map(String::as_str).collect(),
        page: listing.page.page_number(),
        page_size: listing.page.page_size(),
        view: listing.mode,
        search_fields: listing.search_fields.iter().map(|a| a.key()).collect(),
    };
    let records = json_for_script_tag(&serde_json::to_string(all)?);
    let state = json_for_script_tag(&serde_json::to_string(&state)?);

    // Payloads are spliced between fixed template pieces and never rescanned.
    let mut html = String::with_capacity(
        TEMPLATE_HEAD.len()
            + records.len()
            + TEMPLATE_MIDDLE.len()
            + state.len()
            + TEMPLATE_TAIL.len(),
    );
    html.push_str(TEMPLATE_HEAD);
    html.push_str(&records);
    html.push_str(TEMPLATE_MIDDLE);
    html.push_str(&state);
    html.push_str(TEMPLATE_TAIL);
    Ok(html.into_bytes())
}

const TEMPLATE_HEAD: &str = r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Charity Organisation Directory</title>
  <style>
    body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; margin: 0; color: #1e293b; background: #f8fafc; }
    .layout { display: flex; min-height: 100vh; }
    aside { width: 280px; padding: 24px; background: #fff; border-right: 1px solid #e2e8f0; }
    aside label { display: block; font-size: 12px; font-weight: 700; text-transform: uppercase; margin: 18px 0 6px; color: #475569; }
    aside input, aside select { width: 100%; box-sizing: border-box; padding: 8px; border: 1px solid #cbd5e1; border-radius: 6px; }
    aside select[multiple] { height: 140px; }
    main { flex: 1; padding: 32px; }
    h1 { margin: 0 0 4px; }
    .toolbar { display: flex; gap: 12px; align-items: center; margin: 16px 0; }
    .toolbar button { padding: 6px 14px; border: 1px solid #cbd5e1; background: #fff; border-radius: 6px; cursor: pointer; }
    .toolbar button.active { background: #135bec; color: #fff; border-color: #135bec; }
    table { width: 100%; border-collapse: collapse; background: #fff; }
    th, td { text-align: left; padding: 10px 12px; border-bottom: 1px solid #e2e8f0; font-size: 14px; vertical-align: top; }
    th { background: #f1f5f9; font-size: 12px; text-transform: uppercase; }
    .cards { display: grid; grid-template-columns: repeat(2, minmax(0, 1fr)); gap: 20px; }
    .card { background: #fff; border: 1px solid #e2e8f0; border-radius: 10px; padding: 16px; }
    .card h3 { margin: 0 0 8px; }
    .card p { margin: 4px 0; font-size: 14px; }
    .card hr { border: none; border-top: 1px solid #e2e8f0; margin: 12px 0 0; }
    .warning { background: #fef3c7; border: 1px solid #fcd34d; padding: 12px 16px; border-radius: 8px; }
    .pager { display: flex; gap: 10px; align-items: center; margin-top: 20px; }
    .pager input { width: 70px; padding: 6px; }
    .muted { color: #64748b; font-size: 13px; }
  </style>
</head>
<body>
  <script type="application/json" id="records-data">"####;

const TEMPLATE_MIDDLE: &str = r####"</script>
  <script type="application/json" id="state-data">"####;

const TEMPLATE_TAIL: &str = r####"</script>
  <div class="layout">
    <aside>
      <h2>Filters</h2>
      <label for="search">Search by Name, Description, etc.</label>
      <input id="search" type="text"/>
      <label for="categories">Filter by Category</label>
      <select id="categories" multiple></select>
      <label for="countries">Filter by Country</label>
      <select id="countries" multiple></select>
      <p class="muted">Add more data by editing the source CSV file.</p>
    </aside>
    <main>
      <h1>Charity Organisation Directory</h1>
      <p class="muted">Browse and filter the list of charitable organisations.</p>
      <h2 id="summary">Displaying 0 Organisations</h2>
      <div class="toolbar">
        <button id="view-table" type="button">Table</button>
        <button id="view-cards" type="button">Cards</button>
      </div>
      <noscript><div class="warning">This report requires JavaScript to render results.</div></noscript>
      <div id="results"></div>
      <div class="pager">
        <label for="page">Page</label>
        <input id="page" type="number" min="1" value="1"/>
        <span id="page-info" class="muted"></span>
      </div>
    </main>
  </div>

  <script>
    (function() {
      const SENTINEL = 'N/A';
      const DEFAULT_SEARCH_FIELDS = ['organisation_name', 'short_description', 'category_focus'];
      const COLUMNS = [
        ['organisation_name', 'Organisation Name'],
        ['category', 'Category'],
        ['country', 'Country'],
        ['short_description', 'Short Description'],
        ['website_url', 'Website'],
        ['email', 'Email'],
        ['phone', 'Phone']
      ];

      const records = JSON.parse(document.getElementById('records-data').textContent || '[]');
      const initial = JSON.parse(document.getElementById('state-data').textContent || '{}');

      function escapeHtml(value) {
        return String(value)
          .replaceAll('&', '&amp;')
          .replaceAll('<', '&lt;')
          .replaceAll('>', '&gt;')
          .replaceAll('"', '&quot;')
          .replaceAll("'", '&#39;');
      }

      function isLink(value) {
        return /^http/i.test(String(value || ''));
      }

      function website(value) {
        const v = String(value || SENTINEL);
        if (!isLink(v)) return escapeHtml(v);
        return `<a href="${escapeHtml(v)}" target="_blank" rel="noreferrer">${escapeHtml(v)}</a>`;
      }

      function uniqueSorted(key) {
        const out = Array.from(new Set(records.map(r => String(r[key] || SENTINEL))));
        out.sort();
        return out;
      }

      function fillSelect(el, values, selected) {
        for (const v of values) {
          const opt = document.createElement('option');
          opt.value = v;
          opt.textContent = v;
          opt.selected = selected.includes(v);
          el.appendChild(opt);
        }
      }

      function selectedValues(el) {
        return Array.from(el.selectedOptions).map(o => o.value);
      }

      const searchEl = document.getElementById('search');
      const categoriesEl = document.getElementById('categories');
      const countriesEl = document.getElementById('countries');
      const pageEl = document.getElementById('page');
      const pageInfo = document.getElementById('page-info');
      const summary = document.getElementById('summary');
      const results = document.getElementById('results');
      const viewTable = document.getElementById('view-table');
      const viewCards = document.getElementById('view-cards');

      const state = {
        term: initial.term || '',
        categories: initial.categories || [],
        countries: initial.countries || [],
        page: Number(initial.page || 1),
        pageSize: Math.max(1, Number(initial.page_size || 10)),
        view: initial.view === 'cards' ? 'cards' : 'table',
        searchFields: Array.isArray(initial.search_fields) && initial.search_fields.length
          ? initial.search_fields
          : DEFAULT_SEARCH_FIELDS
      };

      searchEl.value = state.term;
      fillSelect(categoriesEl, uniqueSorted('category'), state.categories);
      fillSelect(countriesEl, uniqueSorted('country'), state.countries);

      function matches(r) {
        const term = state.term.trim().toLowerCase();
        if (term) {
          const hit = state.searchFields.some(k => String(r[k] || SENTINEL).toLowerCase().includes(term));
          if (!hit) return false;
        }
        if (state.categories.length && !state.categories.includes(String(r.category || SENTINEL))) return false;
        if (state.countries.length && !state.countries.includes(String(r.country || SENTINEL))) return false;
        return true;
      }

      function renderTable(items) {
        const head = COLUMNS.map(c => `<th>${escapeHtml(c[1])}</th>`).join('');
        const rows = items.map(r => '<tr>' + COLUMNS.map(c => {
          const value = c[0] === 'website_url' ? website(r[c[0]]) : escapeHtml(r[c[0]] || SENTINEL);
          return `<td>${value}</td>`;
        }).join('') + '</tr>').join('');
        return `<table><thead><tr>${head}</tr></thead><tbody>${rows}</tbody></table>`;
      }

      function renderCards(items) {
        const cards = items.map(r => `<div class="card">
            <h3>${escapeHtml(r.organisation_name || SENTINEL)}</h3>
            <p><strong>Category:</strong> ${escapeHtml(r.category || SENTINEL)}</p>
            <p><strong>Country:</strong> ${escapeHtml(r.country || SENTINEL)}</p>
            <p>${escapeHtml(r.short_description || SENTINEL)}</p>
            <p><strong>Website:</strong> ${website(r.website_url)}</p>
            <p><strong>Email:</strong> ${escapeHtml(r.email || SENTINEL)}</p>
            <p><strong>Phone:</strong> ${escapeHtml(r.phone || SENTINEL)}</p>
            <hr/>
          </div>`).join('');
        return `<div class="cards">${cards}</div>`;
      }

      function render() {
        const filtered = records.filter(matches);
        const total = filtered.length;
        const pageCount = Math.max(1, Math.ceil(total / state.pageSize));
        state.page = Math.min(Math.max(1, state.page), pageCount);
        pageEl.max = String(pageCount);
        pageEl.value = String(state.page);

        const start = (state.page - 1) * state.pageSize;
        const end = Math.min(total, start + state.pageSize);
        const slice = filtered.slice(start, end);

        summary.textContent = `Displaying ${total} Organisations`;
        pageInfo.textContent = total === 0
          ? `of ${pageCount} (Showing 0-0)`
          : `of ${pageCount} (Showing ${start + 1}-${end} of ${total})`;

        viewTable.classList.toggle('active', state.view === 'table');
        viewCards.classList.toggle('active', state.view === 'cards');

        if (total === 0) {
          results.innerHTML = '<div class="warning">No organisations match your current filters.</div>';
        } else if (state.view === 'cards') {
          results.innerHTML = renderCards(slice);
        } else {
          results.innerHTML = renderTable(slice);
        }
      }

      function resetAndRender() {
        state.page = 1;
        render();
      }

      searchEl.addEventListener('input', function() {
        state.term = searchEl.value || '';
        resetAndRender();
      });
      categoriesEl.addEventListener('change', function() {
        state.categories = selectedValues(categoriesEl);
        resetAndRender();
      });
      countriesEl.addEventListener('change', function() {
        state.countries = selectedValues(countriesEl);
        resetAndRender();
      });
      pageEl.addEventListener('change', function() {
        state.page = Number(pageEl.value || 1);
        render();
      });
      viewTable.addEventListener('click', function() { state.view = 'table'; render(); });
      viewCards.addEventListener('click', function() { state.view = 'cards'; render(); });

      render();
    })();
  </script>
</body>
</html>
"####;
