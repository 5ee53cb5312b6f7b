pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>geoscreen</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <header>
    <select id="map-type" aria-label="Seleccionar Tipo de Mapa"></select>
    <button id="locate">Mi ubicación</button>
    <span id="status"></span>
  </header>
  <div id="map"></div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"html, body { margin: 0; height: 100%; font-family: system-ui, sans-serif; }
header { display: flex; gap: 8px; align-items: center; padding: 8px 16px; }
#map { position: absolute; top: 48px; bottom: 16px; left: 16px; right: 16px; }
#status { color: #666; font-size: 0.9em; }
"#;

pub const APP_JS: &str = r#"const TILES = {
  normal: 'https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png',
  hybrid: 'https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}',
  terrain: 'https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png',
  satellite: 'https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}',
};

const css = (c) => `rgba(${c.r}, ${c.g}, ${c.b}, ${c.a})`;
const ll = (p) => [p.lat, p.lon];

const map = L.map('map');
let base = null;
let overlay = L.layerGroup().addTo(map);

function draw(scene) {
  if (base) map.removeLayer(base);
  base = L.tileLayer(TILES[scene.map_type], { maxZoom: 21 }).addTo(map);
  overlay.clearLayers();
  for (const m of scene.markers) {
    const opts = {};
    if (m.icon) {
      opts.icon = L.icon({ iconUrl: m.icon.asset, iconSize: [m.icon.size_px / 3, m.icon.size_px / 3] });
    }
    const marker = L.marker(ll(m.position), opts).addTo(overlay);
    marker.bindPopup(m.snippet ? `<b>${m.title}</b><br>${m.snippet}` : `<b>${m.title}</b>`);
  }
  for (const p of scene.polygons) {
    L.polygon(p.points.map(ll), {
      color: css(p.stroke_color), weight: p.stroke_width / 2,
      fillColor: css(p.fill_color), fillOpacity: p.fill_color.a,
    }).bindTooltip(p.name).addTo(overlay);
  }
  for (const r of scene.polylines) {
    L.polyline(r.points.map(ll), { color: css(r.color), weight: r.width / 2 })
      .bindTooltip(`${r.name} (${(r.length_m / 1000).toFixed(2)} km)`).addTo(overlay);
  }
}

async function loadScene() {
  const scene = await (await fetch('/api/scene')).json();
  map.setView(ll(scene.camera.target), scene.camera.zoom);
  draw(scene);
  document.getElementById('map-type').value = scene.map_type;
  if (scene.intro_animation) {
    const a = scene.intro_animation;
    map.flyTo(ll(a.to.target), a.to.zoom, { duration: a.duration_ms / 1000 });
  }
}

async function locate() {
  const status = document.getElementById('status');
  const res = await fetch('/api/locate', { method: 'POST' });
  if (res.status === 200) {
    const body = await res.json();
    status.textContent = body.formatted_coords;
    map.setView(ll(body.camera.target), body.camera.zoom);
  } else if (res.status !== 204) {
    status.textContent = (await res.json()).error;
  }
  draw(await (await fetch('/api/scene')).json());
}

async function setup() {
  const select = document.getElementById('map-type');
  for (const t of await (await fetch('/api/map-types')).json()) {
    const opt = document.createElement('option');
    opt.value = t.id;
    opt.textContent = t.label;
    select.appendChild(opt);
  }
  select.addEventListener('change', async () => {
    const res = await fetch(`/api/map-type?type=${encodeURIComponent(select.value)}`, { method: 'POST' });
    if (res.ok) draw(await res.json());
  });
  document.getElementById('locate').addEventListener('click', locate);
  await loadScene();
  await locate();
}

setup();
"#;
