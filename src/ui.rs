use crate::date_key::DateKey;
use crate::theme::Theme;

pub fn render_index(today: DateKey, percent: u8, theme: Option<Theme>) -> String {
    let theme_name = theme.map(Theme::as_str).unwrap_or("");
    let body_class = match theme {
        Some(Theme::Light) => "theme-light",
        _ => "theme-dark",
    };
    INDEX_HTML
        .replace("{{DATE}}", &today.to_string())
        .replace("{{PERCENT}}", &percent.to_string())
        .replace("{{THEME}}", theme_name)
        .replace("{{BODY_CLASS}}", body_class)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Pixel Habits</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Press+Start+2P&display=swap');

    body.theme-dark {
      --bg: #000;
      --fg: #fff;
      --muted: #9a9a9a;
      --panel: #111;
    }

    body.theme-light {
      --bg: #fff;
      --fg: #000;
      --muted: #5c5c5c;
      --panel: #f2f2f2;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--fg);
      font-family: "Press Start 2P", "Courier New", monospace;
      font-size: 12px;
      line-height: 1.6;
      display: grid;
      place-items: start center;
      padding: 24px 14px 48px;
    }

    .app {
      width: min(820px, 100%);
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: 1.4rem;
    }

    h2 {
      margin: 0 0 10px;
      font-size: 0.95rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.7rem;
    }

    .panel {
      border: 4px solid var(--fg);
      background: var(--panel);
      padding: 16px;
    }

    .arena {
      display: grid;
      gap: 10px;
    }

    #progressCanvas {
      width: 100%;
      height: auto;
      image-rendering: pixelated;
      border: 2px solid var(--fg);
      display: block;
    }

    .overall {
      display: flex;
      justify-content: space-between;
      color: var(--muted);
    }

    .overall strong {
      color: var(--fg);
    }

    form {
      display: grid;
      grid-template-columns: 1fr 120px 110px auto;
      gap: 10px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.65rem;
      color: var(--muted);
    }

    input,
    select {
      font: inherit;
      padding: 8px;
      border: 2px solid var(--fg);
      background: var(--bg);
      color: var(--fg);
    }

    .pixel-button {
      font: inherit;
      appearance: none;
      border: 2px solid var(--fg);
      background: var(--bg);
      color: var(--fg);
      padding: 8px 12px;
      cursor: pointer;
    }

    .pixel-button.primary {
      background: var(--fg);
      color: var(--bg);
    }

    .pixel-button:active {
      transform: translate(2px, 2px);
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 12px;
    }

    .item {
      display: flex;
      justify-content: space-between;
      gap: 12px;
      border: 2px solid var(--fg);
      padding: 12px;
    }

    .item .name {
      font-size: 0.85rem;
    }

    .item .meta {
      color: var(--muted);
      font-size: 0.6rem;
      margin: 4px 0 8px;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      align-items: start;
      justify-content: end;
    }

    .progress {
      position: relative;
      height: 16px;
      border: 2px solid var(--fg);
      width: min(320px, 60vw);
    }

    .progress .fill {
      height: 100%;
      background: var(--fg);
    }

    .progress .label {
      position: absolute;
      inset: 0;
      text-align: center;
      font-size: 0.55rem;
      line-height: 12px;
      mix-blend-mode: difference;
      color: #fff;
    }

    .pills {
      display: flex;
      flex-wrap: wrap;
      gap: 4px;
      margin-top: 8px;
    }

    .pill {
      width: 10px;
      height: 10px;
      border: 2px solid var(--fg);
    }

    .pill.filled {
      background: var(--fg);
    }

    .backup {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .backup a {
      text-decoration: none;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
      font-size: 0.65rem;
    }

    .status[data-type="error"] {
      color: #e0402e;
    }

    .empty {
      color: var(--muted);
      font-size: 0.65rem;
    }

    @media (max-width: 640px) {
      form {
        grid-template-columns: 1fr 1fr;
      }
      .item {
        flex-direction: column;
      }
    }
  </style>
</head>
<body class="{{BODY_CLASS}}" data-theme="{{THEME}}">
  <main class="app">
    <header>
      <div>
        <h1>Pixel Habits</h1>
        <p class="subtitle" id="today">{{DATE}}</p>
      </div>
      <button class="pixel-button" id="themeToggle" type="button" aria-label="Toggle theme">☾</button>
    </header>

    <section class="panel arena">
      <canvas id="progressCanvas" width="320" height="120"></canvas>
      <div class="overall">
        <span>Today</span>
        <strong id="overallPercent">{{PERCENT}}%</strong>
      </div>
    </section>

    <section class="panel">
      <h2>New quest</h2>
      <form id="addForm">
        <label>Name
          <input name="itemName" id="itemName" maxlength="80" required />
        </label>
        <label>Type
          <select name="itemType" id="itemType">
            <option value="habit">Habit</option>
            <option value="task">Task</option>
          </select>
        </label>
        <label id="targetLabel">Per day
          <input name="target" id="itemTarget" type="number" min="1" value="1" />
        </label>
        <button class="pixel-button primary" type="submit">Add</button>
      </form>
    </section>

    <section class="panel">
      <h2>Habits</h2>
      <ul id="habitsList"></ul>
    </section>

    <section class="panel">
      <h2>Tasks</h2>
      <ul id="tasksList"></ul>
    </section>

    <section class="panel">
      <h2>Completed</h2>
      <ul id="completedList"></ul>
    </section>

    <section class="panel backup">
      <a class="pixel-button" id="exportData" href="/api/export" download>Export</a>
      <label class="pixel-button" for="importData">Import</label>
      <input type="file" id="importData" accept="application/json" hidden />
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const habitsListEl = document.getElementById('habitsList');
    const tasksListEl = document.getElementById('tasksList');
    const completedListEl = document.getElementById('completedList');
    const addFormEl = document.getElementById('addForm');
    const itemTypeEl = document.getElementById('itemType');
    const targetLabelEl = document.getElementById('targetLabel');
    const themeToggleEl = document.getElementById('themeToggle');
    const importInputEl = document.getElementById('importData');
    const overallPercentEl = document.getElementById('overallPercent');
    const todayEl = document.getElementById('today');
    const statusEl = document.getElementById('status');
    const canvas = document.getElementById('progressCanvas');
    const ctx = canvas.getContext('2d');

    let summary = null;
    let sparkleTimer = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (method, path, body) => {
      const init = { method, headers: {} };
      if (body !== undefined) {
        init.headers['content-type'] = 'application/json';
        init.body = typeof body === 'string' ? body : JSON.stringify(body);
      }
      const res = await fetch(path, init);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const colors = () => {
      const isLight = document.body.classList.contains('theme-light');
      return { bg: isLight ? '#fff' : '#000', fg: isLight ? '#000' : '#fff' };
    };

    const drawArena = () => {
      const { bg, fg } = colors();
      const w = canvas.width;
      const h = canvas.height;
      const percent = summary ? summary.arena.percent : 0;
      const hearts = summary ? summary.arena.hearts : 10;
      const filled = summary ? summary.arena.hearts_filled : 0;

      ctx.imageSmoothingEnabled = false;
      ctx.fillStyle = bg;
      ctx.fillRect(0, 0, w, h);

      const groundY = Math.floor(h * 0.72);
      ctx.fillStyle = fg;
      for (let x = 0; x < w; x += 8) {
        ctx.fillRect(x, groundY, 6, 6);
      }

      const heartSize = 8;
      for (let i = 0; i < hearts; i += 1) {
        const x = 8 + i * (heartSize + 4);
        ctx.strokeStyle = fg;
        ctx.strokeRect(x, 8, heartSize, heartSize);
        if (i < filled) {
          ctx.fillStyle = fg;
          ctx.fillRect(x + 1, 9, heartSize - 2, heartSize - 2);
        }
      }

      const flagX = w - 24;
      ctx.fillStyle = fg;
      ctx.fillRect(flagX, groundY - 24, 2, 24);
      ctx.fillRect(flagX, groundY - 24, 12, 8);

      const heroSize = 12;
      const pathStart = 8;
      const pathEnd = flagX - heroSize - 4;
      const x = Math.round(pathStart + ((pathEnd - pathStart) * percent) / 100);
      const y = groundY - heroSize;
      ctx.fillStyle = fg;
      ctx.fillRect(x, y, heroSize, heroSize);
      ctx.fillStyle = bg;
      ctx.fillRect(x + 3, y + 3, 2, 2);
    };

    const sparkle = () => {
      if (sparkleTimer !== null) {
        clearInterval(sparkleTimer);
        sparkleTimer = null;
      }
      const { fg } = colors();
      const points = Array.from({ length: 10 }, () => ({
        x: Math.random() * canvas.width,
        y: Math.random() * canvas.height,
        life: 8
      }));
      let frame = 0;
      sparkleTimer = setInterval(() => {
        frame += 1;
        points.forEach((p) => {
          if (p.life <= 0) {
            return;
          }
          ctx.fillStyle = fg;
          ctx.fillRect(Math.floor(p.x), Math.floor(p.y), 2, 2);
          p.y -= 1;
          p.life -= 1;
        });
        if (frame > 8) {
          clearInterval(sparkleTimer);
          sparkleTimer = null;
          drawArena();
        }
      }, 30);
    };

    const el = (tag, className, text) => {
      const node = document.createElement(tag);
      if (className) {
        node.className = className;
      }
      if (text !== undefined) {
        node.textContent = text;
      }
      return node;
    };

    const button = (text, primary, onClick) => {
      const node = el('button', primary ? 'pixel-button primary' : 'pixel-button', text);
      node.type = 'button';
      node.addEventListener('click', () => onClick().catch((err) => setStatus(err.message, 'error')));
      return node;
    };

    const progressBar = (percent, label) => {
      const bar = el('div', 'progress');
      const fill = el('div', 'fill');
      fill.style.width = `${percent}%`;
      bar.appendChild(fill);
      bar.appendChild(el('div', 'label', label));
      return bar;
    };

    const adjust = async (item, delta) => {
      const res = await api('POST', `/api/items/${encodeURIComponent(item.id)}/adjust`, { delta });
      if (res.reached_target && confirm(`Mark task “${item.name}” as completed?`)) {
        await api('POST', `/api/items/${encodeURIComponent(item.id)}/archive`);
      }
      await refresh();
      sparkle();
    };

    const edit = async (item) => {
      const name = prompt('Name', item.name);
      if (!name) {
        return;
      }
      const targetStr = prompt('Target (number)', String(item.target));
      const target = parseInt(targetStr || '1', 10);
      await api('PUT', `/api/items/${encodeURIComponent(item.id)}`, {
        name,
        target: Number.isNaN(target) ? 1 : target
      });
      await refresh();
    };

    const archive = async (item) => {
      if (!confirm(`Archive ${item.type} “${item.name}”?`)) {
        return;
      }
      await api('POST', `/api/items/${encodeURIComponent(item.id)}/archive`);
      await refresh();
    };

    const renderActive = (item) => {
      const li = el('li', 'item');
      const left = el('div');
      const right = el('div', 'actions');
      left.appendChild(el('div', 'name', item.name));

      const pills = el('div', 'pills');
      if (item.type === 'habit') {
        left.appendChild(el('div', 'meta', `Habit • target ${item.target}/day`));
        left.appendChild(progressBar(item.percent, `${item.count} / ${item.target}`));
        item.week.forEach((day) => {
          const pill = el('div', day.met ? 'pill filled' : 'pill');
          pill.title = `${day.date}: ${day.count}/${item.target}`;
          pills.appendChild(pill);
        });
      } else {
        left.appendChild(el('div', 'meta', `Task • ${item.count} / ${item.target} steps`));
        left.appendChild(progressBar(item.percent, `${item.percent}%`));
        for (let i = 0; i < Math.min(24, item.target); i += 1) {
          pills.appendChild(el('div', i < item.count ? 'pill filled' : 'pill'));
        }
      }
      left.appendChild(pills);

      right.appendChild(button('−', false, () => adjust(item, -1)));
      right.appendChild(button('+', true, () => adjust(item, 1)));
      right.appendChild(button('Edit', false, () => edit(item)));
      right.appendChild(button('Archive', false, () => archive(item)));

      li.appendChild(left);
      li.appendChild(right);
      return li;
    };

    const renderCompleted = (item) => {
      const li = el('li', 'item');
      const left = el('div');
      const right = el('div', 'actions');
      left.appendChild(el('div', 'name', item.name));
      left.appendChild(el('div', 'meta', item.type === 'task' ? 'Task • done' : 'Habit • archived'));

      right.appendChild(button('Restore', false, async () => {
        await api('POST', `/api/items/${encodeURIComponent(item.id)}/restore`);
        await refresh();
      }));
      right.appendChild(button('Delete', false, async () => {
        if (!confirm(`Delete “${item.name}” permanently?`)) {
          return;
        }
        await api('DELETE', `/api/items/${encodeURIComponent(item.id)}`);
        await refresh();
      }));

      li.appendChild(left);
      li.appendChild(right);
      return li;
    };

    const fillList = (listEl, items, renderItem, emptyText) => {
      listEl.innerHTML = '';
      if (!items.length) {
        listEl.appendChild(el('li', 'empty', emptyText));
        return;
      }
      items.forEach((item) => listEl.appendChild(renderItem(item)));
    };

    const render = () => {
      const active = summary.items.filter((item) => !item.archived);
      fillList(habitsListEl, active.filter((item) => item.type === 'habit'), renderActive, 'No habits yet.');
      fillList(tasksListEl, active.filter((item) => item.type === 'task'), renderActive, 'No tasks yet.');
      fillList(completedListEl, summary.items.filter((item) => item.archived), renderCompleted, 'Nothing here.');
      overallPercentEl.textContent = `${summary.overall_percent}%`;
      todayEl.textContent = summary.today;
      drawArena();
    };

    const refresh = async () => {
      summary = await api('GET', '/api/summary');
      if (summary.notice) {
        setStatus(summary.notice, 'error');
      }
      render();
    };

    const applyTheme = (theme) => {
      const isLight = theme === 'light';
      document.body.classList.toggle('theme-light', isLight);
      document.body.classList.toggle('theme-dark', !isLight);
      themeToggleEl.textContent = isLight ? '☀' : '☾';
      drawArena();
    };

    const initTheme = async () => {
      const saved = document.body.dataset.theme;
      if (saved === 'light' || saved === 'dark') {
        applyTheme(saved);
        return;
      }
      const prefersLight = window.matchMedia && window.matchMedia('(prefers-color-scheme: light)').matches;
      const res = await api('PUT', '/api/theme', { theme: prefersLight ? 'light' : 'dark' });
      applyTheme(res.theme);
    };

    const syncTargetLabel = () => {
      targetLabelEl.firstChild.textContent = itemTypeEl.value === 'task' ? 'Steps' : 'Per day';
    };

    addFormEl.addEventListener('submit', (event) => {
      event.preventDefault();
      const formData = new FormData(addFormEl);
      const type = String(formData.get('itemType')) === 'task' ? 'task' : 'habit';
      const target = parseInt(String(formData.get('target') || '1'), 10);
      api('POST', '/api/items', {
        type,
        name: String(formData.get('itemName') || ''),
        target: Number.isNaN(target) ? 1 : target
      })
        .then(() => {
          addFormEl.reset();
          itemTypeEl.value = type;
          syncTargetLabel();
          return refresh();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    itemTypeEl.addEventListener('change', syncTargetLabel);

    themeToggleEl.addEventListener('click', () => {
      api('POST', '/api/theme/toggle')
        .then((res) => applyTheme(res.theme))
        .catch((err) => setStatus(err.message, 'error'));
    });

    importInputEl.addEventListener('change', () => {
      const file = importInputEl.files && importInputEl.files[0];
      if (!file) {
        return;
      }
      file.text()
        .then((text) => api('POST', '/api/import', text))
        .then((res) => {
          setStatus(`Imported ${res.imported} items`, 'ok');
          return refresh();
        })
        .catch(() => alert('Failed to import file'))
        .finally(() => {
          importInputEl.value = '';
        });
    });

    initTheme().catch((err) => setStatus(err.message, 'error'));
    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
