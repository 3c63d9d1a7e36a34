//! Quantity take-off: extraction, grouping, summaries and pricing
//!
//! Everything here is a pure function of its inputs. Items, groups and
//! summaries are derived data; callers recompute them rather than patching.

use std::collections::BTreeMap;

use crate::core::geometry::{self, BoundingBox};
use crate::entities::model::{ModelData, ModelElement};
use crate::entities::quantity::{QuantificationGroup, QuantificationSummary, QuantityItem};

const MATERIAL_KEYS: &[&str] = &["Material", "MaterialName", "ObjectType"];
const PHASE_KEYS: &[&str] = &["Phase", "ConstructionPhase", "Status"];

/// Options for [`extract_quantities`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractOptions {
    /// Fold elements with the same type, name, material, phase and
    /// dimensions into one item carrying a count
    pub fold_identical: bool,
}

/// Take-off category for an IFC type
pub fn category_for_type(ifc_type: &str) -> &'static str {
    match ifc_type {
        "IFCWALL" | "IFCWALLSTANDARDCASE" | "IFCSLAB" | "IFCCOLUMN" | "IFCBEAM" => "Structural",
        "IFCFOOTING" | "IFCPILE" => "Foundation",
        "IFCDOOR" | "IFCWINDOW" => "Openings",
        "IFCSTAIR" | "IFCRAILING" => "Circulation",
        "IFCROOF" => "Roofing",
        "IFCFURNISHINGELEMENT" => "Furniture",
        "IFCMEMBER" | "IFCPLATE" => "Complementary",
        "IFCCOVERING" => "Finishes",
        _ => "Other",
    }
}

/// Billing unit for an IFC type
pub fn unit_for_type(ifc_type: &str) -> &'static str {
    match ifc_type {
        "IFCWALL" | "IFCWALLSTANDARDCASE" | "IFCSLAB" | "IFCROOF" | "IFCCOVERING" => "m²",
        "IFCBEAM" | "IFCRAILING" | "IFCMEMBER" => "m",
        _ => "un",
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Measures {
    length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    area: Option<f64>,
    volume: Option<f64>,
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Measures from explicit quantities, else from the element geometry
///
/// Dimensions come from the bounding box. Volume comes from the closed
/// mesh when it encloses any, else from the box. Walls and slab-like types
/// use their take-off area rules; other types report mesh surface area.
fn measures_for(element: &ModelElement) -> Measures {
    if let Some(q) = element.quantities.as_ref().filter(|q| !q.is_empty()) {
        return Measures {
            length: q.length.and_then(positive),
            width: q.width.and_then(positive),
            height: q.height.and_then(positive),
            area: q.area.and_then(positive),
            volume: q.volume.and_then(positive),
        };
    }

    let Some(geometry) = element.geometry.as_ref().filter(|g| !g.indices.is_empty()) else {
        return Measures::default();
    };
    let Some(bbox) = BoundingBox::from_flat_vertices(&geometry.vertices) else {
        return Measures::default();
    };
    let triangles = geometry::mesh_triangles(&geometry.vertices, &geometry.indices)
        .unwrap_or_default();

    let size = bbox.size();
    let (l, w, h) = (size.x, size.y, size.z);
    let area = match element.ifc_type.as_str() {
        "IFCWALL" | "IFCWALLSTANDARDCASE" => positive(l * h * 2.0 + w * h * 2.0),
        "IFCSLAB" | "IFCROOF" | "IFCCOVERING" => positive(l * w),
        _ => positive(geometry::mesh_surface_area(&triangles)),
    };

    // A flat box has no volume, and then no dimensions are reported
    match positive(bbox.volume()) {
        Some(box_volume) => Measures {
            length: Some(l),
            width: Some(w),
            height: Some(h),
            area,
            volume: positive(geometry::mesh_volume(&triangles)).or(Some(box_volume)),
        },
        None => Measures {
            area,
            ..Measures::default()
        },
    }
}

fn item_for(element: &ModelElement) -> QuantityItem {
    let m = measures_for(element);
    let name = if element.name.trim().is_empty() {
        element.ifc_type.clone()
    } else {
        element.name.clone()
    };

    QuantityItem {
        id: element.express_id.to_string(),
        name,
        item_type: element.ifc_type.clone(),
        category: category_for_type(&element.ifc_type).to_string(),
        material: element.first_property(MATERIAL_KEYS),
        phase: element.first_property(PHASE_KEYS),
        length: m.length,
        width: m.width,
        height: m.height,
        area: m.area,
        volume: m.volume,
        count: 1,
        unit: unit_for_type(&element.ifc_type).to_string(),
        unit_price: None,
        total_price: None,
        properties: element.properties.clone(),
    }
}

/// Key identifying items that fold together; dimensions compared in mm
fn fold_key(item: &QuantityItem) -> (String, String, Option<String>, Option<String>, [Option<i64>; 3]) {
    let mm = |v: Option<f64>| v.map(|v| (v * 1000.0).round() as i64);
    (
        item.item_type.clone(),
        item.name.clone(),
        item.material.clone(),
        item.phase.clone(),
        [mm(item.length), mm(item.width), mm(item.height)],
    )
}

fn fold_identical(items: Vec<QuantityItem>) -> Vec<QuantityItem> {
    let mut folded: Vec<QuantityItem> = Vec::new();
    let mut index = BTreeMap::new();

    for item in items {
        let key = fold_key(&item);
        match index.get(&key) {
            Some(&i) => {
                let target: &mut QuantityItem = &mut folded[i];
                target.count += item.count;
                target.area = sum_opt(target.area, item.area);
                target.volume = sum_opt(target.volume, item.volume);
            }
            None => {
                index.insert(key, folded.len());
                folded.push(item);
            }
        }
    }

    folded
}

fn sum_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

/// Length an item stands for: its per-element length times its count
///
/// Folded items keep the dimension of one element, so length totals
/// weight by count where area and volume are already summed.
fn run_length(item: &QuantityItem) -> Option<f64> {
    item.length.map(|l| l * f64::from(item.count))
}

/// Sum a field over the items that carry it; `None` if none do
fn total<'a, I, F>(items: I, field: F) -> Option<f64>
where
    I: IntoIterator<Item = &'a QuantityItem>,
    F: Fn(&QuantityItem) -> Option<f64>,
{
    items.into_iter().filter_map(field).fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// One quantity item per model element, in model order
pub fn extract_quantities(model: &ModelData, options: ExtractOptions) -> Vec<QuantityItem> {
    let items: Vec<QuantityItem> = model.elements.iter().map(item_for).collect();
    tracing::debug!(elements = model.elements.len(), "quantities extracted");

    if options.fold_identical {
        fold_identical(items)
    } else {
        items
    }
}

/// Group items by category, in the order categories first appear
pub fn group_quantities(items: &[QuantityItem]) -> Vec<QuantificationGroup> {
    let mut groups: Vec<QuantificationGroup> = Vec::new();

    for item in items {
        match groups.iter_mut().find(|g| g.category == item.category) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(QuantificationGroup {
                category: item.category.clone(),
                items: vec![item.clone()],
                total_count: 0,
                total_volume: None,
                total_area: None,
                total_length: None,
                total_cost: None,
            }),
        }
    }

    for group in &mut groups {
        group.total_count = group.items.iter().map(|i| u64::from(i.count)).sum();
        group.total_volume = total(&group.items, |i| i.volume);
        group.total_area = total(&group.items, |i| i.area);
        group.total_length = total(&group.items, run_length);
        group.total_cost = total(&group.items, |i| i.total_price);
    }

    groups
}

/// Totals and breakdowns over a whole item set
pub fn generate_summary(items: &[QuantityItem]) -> QuantificationSummary {
    let mut by_type = BTreeMap::new();
    let mut by_material = BTreeMap::new();
    let mut by_phase = BTreeMap::new();

    for item in items {
        let n = u64::from(item.count);
        *by_type.entry(item.item_type.clone()).or_insert(0) += n;
        if let Some(material) = &item.material {
            *by_material.entry(material.clone()).or_insert(0) += n;
        }
        if let Some(phase) = &item.phase {
            *by_phase.entry(phase.clone()).or_insert(0) += n;
        }
    }

    QuantificationSummary {
        groups: group_quantities(items),
        total_items: items.iter().map(|i| u64::from(i.count)).sum(),
        total_volume: total(items, |i| i.volume),
        total_area: total(items, |i| i.area),
        total_length: total(items, run_length),
        total_cost: total(items, |i| i.total_price),
        by_type,
        by_material,
        by_phase,
    }
}

/// Price items from a table keyed by IFC type or category
///
/// The type entry wins over the category entry. Items with neither stay
/// unpriced.
pub fn apply_pricing(items: &[QuantityItem], prices: &BTreeMap<String, f64>) -> Vec<QuantityItem> {
    items
        .iter()
        .map(|item| {
            let price = prices
                .get(&item.item_type)
                .or_else(|| prices.get(&item.category));
            match price {
                Some(&p) => item.clone().with_unit_price(p),
                None => item.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::model::{ElementGeometry, ElementQuantities, PropertyValue};
    use approx::assert_relative_eq;

    fn element(id: u64, ifc_type: &str, name: &str) -> ModelElement {
        ModelElement {
            express_id: id,
            ifc_type: ifc_type.to_string(),
            guid: String::new(),
            name: name.to_string(),
            description: String::new(),
            properties: BTreeMap::new(),
            quantities: None,
            geometry: None,
        }
    }

    /// Box from the origin to (x, y, z) with a single dummy triangle
    fn boxed(mut e: ModelElement, x: f32, y: f32, z: f32) -> ModelElement {
        e.geometry = Some(ElementGeometry {
            vertices: vec![0.0, 0.0, 0.0, x, y, z],
            indices: vec![0, 1, 0],
        });
        e
    }

    fn model(elements: Vec<ModelElement>) -> ModelData {
        ModelData {
            name: "Test".to_string(),
            description: String::new(),
            elements,
        }
    }

    #[test]
    fn test_wall_measures_from_bounding_box() {
        let m = model(vec![boxed(element(1, "IFCWALL", "Wall A"), 4.0, 0.25, 3.0)]);
        let items = extract_quantities(&m, ExtractOptions::default());
        let wall = &items[0];
        assert_eq!(wall.id, "1");
        assert_eq!(wall.category, "Structural");
        assert_eq!(wall.unit, "m²");
        assert_relative_eq!(wall.length.unwrap(), 4.0);
        assert_relative_eq!(wall.area.unwrap(), 4.0 * 3.0 * 2.0 + 0.25 * 3.0 * 2.0);
        assert_relative_eq!(wall.volume.unwrap(), 3.0);
    }

    #[test]
    fn test_slab_area_and_unknown_type() {
        let m = model(vec![
            boxed(element(1, "IFCSLAB", ""), 5.0, 4.0, 0.5),
            boxed(element(2, "IFCPROXY", "Thing"), 1.0, 1.0, 1.0),
        ]);
        let items = extract_quantities(&m, ExtractOptions::default());
        assert_eq!(items[0].name, "IFCSLAB");
        assert_relative_eq!(items[0].area.unwrap(), 20.0);
        assert_eq!(items[1].category, "Other");
        assert_eq!(items[1].unit, "un");
        assert_eq!(items[1].area, None);
    }

    #[test]
    fn test_element_without_geometry_has_no_measures() {
        let mut e = element(7, "IFCDOOR", "Door");
        e.geometry = Some(ElementGeometry {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.1],
            indices: vec![],
        });
        let items = extract_quantities(&model(vec![e]), ExtractOptions::default());
        assert_eq!(items[0].volume, None);
        assert_eq!(items[0].length, None);
        assert_eq!(items[0].count, 1);
    }

    #[test]
    fn test_explicit_quantities_win() {
        let mut e = boxed(element(3, "IFCBEAM", "B1"), 9.0, 9.0, 9.0);
        e.quantities = Some(ElementQuantities {
            length: Some(6.0),
            volume: Some(0.24),
            ..ElementQuantities::default()
        });
        let items = extract_quantities(&model(vec![e]), ExtractOptions::default());
        assert_eq!(items[0].length, Some(6.0));
        assert_eq!(items[0].volume, Some(0.24));
        assert_eq!(items[0].width, None);
        assert_eq!(items[0].unit, "m");
    }

    #[test]
    fn test_material_and_phase_fallbacks() {
        let mut e = element(1, "IFCCOLUMN", "C1");
        e.properties.insert("Material".into(), PropertyValue::Text(String::new()));
        e.properties.insert("MaterialName".into(), PropertyValue::Text("Concrete".into()));
        e.properties.insert("Status".into(), PropertyValue::Text("New".into()));
        let items = extract_quantities(&model(vec![e]), ExtractOptions::default());
        assert_eq!(items[0].material.as_deref(), Some("Concrete"));
        assert_eq!(items[0].phase.as_deref(), Some("New"));
    }

    #[test]
    fn test_fold_identical() {
        let m = model(vec![
            boxed(element(1, "IFCWINDOW", "W"), 1.2, 0.1, 1.5),
            boxed(element(2, "IFCWINDOW", "W"), 1.2, 0.1, 1.5),
            boxed(element(3, "IFCWINDOW", "W"), 0.6, 0.1, 1.5),
        ]);
        let folded = extract_quantities(&m, ExtractOptions { fold_identical: true });
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].id, "1");
        assert_eq!(folded[0].count, 2);
        assert_relative_eq!(folded[0].length.unwrap(), 1.2, epsilon = 1e-6);
        assert_relative_eq!(folded[0].volume.unwrap(), 2.0 * 1.2 * 0.1 * 1.5, epsilon = 1e-6);
        assert_eq!(folded[1].count, 1);

        let summary = generate_summary(&folded);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.by_type.get("IFCWINDOW"), Some(&3));
    }

    #[test]
    fn test_folded_length_totals_weight_by_count() {
        let beam = |id| {
            let mut e = element(id, "IFCBEAM", "B");
            e.quantities = Some(ElementQuantities {
                length: Some(6.0),
                volume: Some(0.48),
                ..ElementQuantities::default()
            });
            e
        };
        let m = model(vec![beam(1), beam(2), beam(3)]);
        let plain = generate_summary(&extract_quantities(&m, ExtractOptions::default()));
        let folded_items = extract_quantities(&m, ExtractOptions { fold_identical: true });
        let folded = generate_summary(&folded_items);

        assert_eq!(folded_items.len(), 1);
        assert_eq!(folded_items[0].length, Some(6.0));
        assert_relative_eq!(plain.total_length.unwrap(), 18.0);
        assert_relative_eq!(folded.total_length.unwrap(), 18.0);
        assert_relative_eq!(folded.groups[0].total_length.unwrap(), 18.0);
        assert_relative_eq!(folded.total_volume.unwrap(), plain.total_volume.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_mesh_volume_preferred_over_box() {
        // tetrahedron on the unit axes
        let mut e = element(1, "IFCFURNISHINGELEMENT", "Wedge");
        e.geometry = Some(ElementGeometry {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        });
        let items = extract_quantities(&model(vec![e]), ExtractOptions::default());
        let wedge = &items[0];
        assert_relative_eq!(wedge.volume.unwrap(), 1.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(wedge.area.unwrap(), 1.5 + 3f64.sqrt() / 2.0, epsilon = 1e-6);
        assert_relative_eq!(wedge.length.unwrap(), 1.0);
    }

    #[test]
    fn test_wall_area_rule_ignores_mesh_area() {
        // out-of-range index: no usable mesh, box values only
        let mut e = element(1, "IFCWALL", "W");
        e.geometry = Some(ElementGeometry {
            vertices: vec![0.0, 0.0, 0.0, 2.0, 0.5, 1.0],
            indices: vec![0, 1, 9],
        });
        let items = extract_quantities(&model(vec![e]), ExtractOptions::default());
        assert_relative_eq!(items[0].area.unwrap(), 2.0 * 1.0 * 2.0 + 0.5 * 1.0 * 2.0);
        assert_relative_eq!(items[0].volume.unwrap(), 1.0);
    }

    #[test]
    fn test_grouping_is_first_seen_ordered() {
        let m = model(vec![
            element(1, "IFCDOOR", "D"),
            boxed(element(2, "IFCSLAB", "S"), 2.0, 2.0, 0.2),
            element(3, "IFCWINDOW", "W"),
        ]);
        let items = extract_quantities(&m, ExtractOptions::default());
        let groups = group_quantities(&items);
        let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, ["Openings", "Structural"]);

        let openings = &groups[0];
        assert_eq!(openings.total_count, 2);
        assert_eq!(openings.total_volume, None);
        assert_eq!(openings.total_cost, None);

        let structural = &groups[1];
        assert_relative_eq!(structural.total_area.unwrap(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_summary_breakdowns() {
        let mut a = element(1, "IFCWALL", "A");
        a.properties.insert("Material".into(), PropertyValue::Text("Brick".into()));
        let mut b = element(2, "IFCWALL", "B");
        b.properties.insert("Material".into(), PropertyValue::Text("Brick".into()));
        b.properties.insert("Phase".into(), PropertyValue::Text("Existing".into()));
        let c = element(3, "IFCBEAM", "C");

        let items = extract_quantities(&model(vec![a, b, c]), ExtractOptions::default());
        let summary = generate_summary(&items);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.by_type.get("IFCWALL"), Some(&2));
        assert_eq!(summary.by_material.get("Brick"), Some(&2));
        assert_eq!(summary.by_phase.len(), 1);
        assert_eq!(summary.total_volume, None);
        assert_eq!(summary.groups.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let summary = generate_summary(&[]);
        assert!(summary.groups.is_empty());
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_area, None);
        assert!(extract_quantities(&ModelData::default(), ExtractOptions::default()).is_empty());
    }

    #[test]
    fn test_pricing_prefers_type_over_category() {
        let items = extract_quantities(
            &model(vec![
                element(1, "IFCWALL", "W"),
                element(2, "IFCCOLUMN", "C"),
                element(3, "IFCDOOR", "D"),
            ]),
            ExtractOptions::default(),
        );
        let prices = BTreeMap::from([
            ("IFCWALL".to_string(), 50.0),
            ("Structural".to_string(), 10.0),
        ]);
        let priced = apply_pricing(&items, &prices);

        assert_eq!(priced[0].unit_price, Some(50.0));
        assert_eq!(priced[0].total_price, Some(50.0));
        assert_eq!(priced[1].unit_price, Some(10.0));
        assert_eq!(priced[2].unit_price, None);
        assert_eq!(priced[2].total_price, None);

        let summary = generate_summary(&priced);
        assert_eq!(summary.total_cost, Some(60.0));
        // input untouched
        assert_eq!(items[0].unit_price, None);
    }

    #[test]
    fn test_tables() {
        assert_eq!(category_for_type("IFCPILE"), "Foundation");
        assert_eq!(category_for_type("IFCCOVERING"), "Finishes");
        assert_eq!(unit_for_type("IFCRAILING"), "m");
        assert_eq!(unit_for_type("IFCPLATE"), "un");
    }
}
