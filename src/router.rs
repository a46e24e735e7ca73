//! Which layers a property write invalidates.
//!
//! The table is static: every [`Property`] maps to whether the geometry cache
//! must be recomputed, which layers must be rebuilt and whether the value
//! fast path applies. Geometry changes rebuild every layer.

/// A writable gauge property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Position,
    Size,
    Min,
    Max,
    StartAngle,
    EndAngle,
    Tick,
    Subtick,
    CadranColor,
    DisplayFirst,
    DisplayLast,
    ValueFontSize,
    Sectors,
    SectorWidth,
    ShadowColor,
    Label,
    LabelRadiusRatio,
    LabelAngleRatio,
    LabelIcon,
    LabelIconScale,
    LabelFontSize,
    NeedleColor,
    NeedleImage,
    Value,
    Thickness,
    ExtendedTouch,
}

/// A group of scenes rebuilt together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Sectors and shadow.
    Background,
    /// Outer ring, ticks and tick labels.
    FullCadran,
    Label,
    Needle,
}

impl Layer {
    /// Rebuild order. Later layers draw over earlier ones.
    pub const ORDER: [Layer; 4] = [
        Layer::Background,
        Layer::FullCadran,
        Layer::Label,
        Layer::Needle,
    ];
}

/// What a single property write invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pub geometry: bool,
    pub layers: &'static [Layer],
    /// Only the needle rotation and the shadow end move.
    pub value: bool,
}

const NOTHING: Invalidation = Invalidation {
    geometry: false,
    layers: &[],
    value: false,
};

const fn layers(layers: &'static [Layer]) -> Invalidation {
    Invalidation {
        geometry: false,
        layers,
        value: false,
    }
}

pub const fn invalidation(property: Property) -> Invalidation {
    use Property::*;
    match property {
        Position | Size | Min | Max | StartAngle | EndAngle => Invalidation {
            geometry: true,
            layers: &Layer::ORDER,
            value: false,
        },
        Sectors | SectorWidth | ShadowColor => layers(&[Layer::Background]),
        Tick | Subtick | CadranColor | DisplayFirst | DisplayLast | ValueFontSize => {
            layers(&[Layer::FullCadran])
        }
        Label | LabelRadiusRatio | LabelAngleRatio | LabelIcon | LabelIconScale
        | LabelFontSize => layers(&[Layer::Label]),
        NeedleColor | NeedleImage => layers(&[Layer::Needle]),
        Value => Invalidation {
            geometry: false,
            layers: &[],
            value: true,
        },
        Thickness | ExtendedTouch => NOTHING,
    }
}

/// Merged invalidation for several properties written together. Layers come
/// back in [`Layer::ORDER`], each at most once.
pub fn merge(properties: &[Property]) -> (bool, Vec<Layer>, bool) {
    let all: Vec<Invalidation> = properties.iter().map(|p| invalidation(*p)).collect();
    let geometry = all.iter().any(|i| i.geometry);
    let layers = Layer::ORDER
        .into_iter()
        .filter(|layer| all.iter().any(|i| i.layers.contains(layer)))
        .collect();
    let value = all.iter().any(|i| i.value);
    (geometry, layers, value)
}

/// Redraw counters, one per kind of work done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawStats {
    pub geometry: u64,
    pub background: u64,
    pub full_cadran: u64,
    pub label: u64,
    pub needle: u64,
    /// Fast value updates.
    pub value: u64,
}

impl RedrawStats {
    pub fn record(&mut self, layer: Layer) {
        match layer {
            Layer::Background => self.background += 1,
            Layer::FullCadran => self.full_cadran += 1,
            Layer::Label => self.label += 1,
            Layer::Needle => self.needle += 1,
        }
    }

    pub fn layer_total(&self) -> u64 {
        self.background + self.full_cadran + self.label + self.needle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_properties_rebuild_everything() {
        for property in [
            Property::Position,
            Property::Size,
            Property::Min,
            Property::Max,
            Property::StartAngle,
            Property::EndAngle,
        ] {
            let inv = invalidation(property);
            assert!(inv.geometry, "{property:?}");
            assert_eq!(inv.layers, &Layer::ORDER);
        }
    }

    #[test]
    fn needle_color_touches_only_the_needle() {
        let inv = invalidation(Property::NeedleColor);
        assert!(!inv.geometry && !inv.value);
        assert_eq!(inv.layers, &[Layer::Needle]);
    }

    #[test]
    fn value_takes_the_fast_path() {
        let inv = invalidation(Property::Value);
        assert!(inv.value);
        assert!(inv.layers.is_empty() && !inv.geometry);
    }

    #[test]
    fn inert_properties_do_nothing() {
        assert_eq!(invalidation(Property::Thickness), NOTHING);
        assert_eq!(invalidation(Property::ExtendedTouch), NOTHING);
    }

    #[test]
    fn merge_keeps_fixed_order_without_duplicates() {
        let (geometry, layers, value) = merge(&[
            Property::NeedleColor,
            Property::Label,
            Property::ShadowColor,
            Property::LabelFontSize,
        ]);
        assert!(!geometry && !value);
        assert_eq!(layers, vec![Layer::Background, Layer::Label, Layer::Needle]);

        let (geometry, layers, _) = merge(&[Property::Position, Property::Size]);
        assert!(geometry);
        assert_eq!(layers, Layer::ORDER.to_vec());
    }

    #[test]
    fn stats_count_per_layer() {
        let mut stats = RedrawStats::default();
        stats.record(Layer::Needle);
        stats.record(Layer::Needle);
        stats.record(Layer::Label);
        assert_eq!(stats.needle, 2);
        assert_eq!(stats.layer_total(), 3);
    }
}
