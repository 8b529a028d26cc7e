use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::layer::GeomLayer;

/// PROJ.4 definition for an EPSG code this tool understands. Unknown codes
/// are a hard input error: guessing a datum would silently corrupt every
/// downstream intersection test.
fn epsg_to_proj4(epsg: u32) -> Result<&'static str> {
    match epsg {
        4326 => Ok("+proj=longlat +datum=WGS84 +no_defs +type=crs"),
        4269 => Ok("+proj=longlat +datum=NAD83 +no_defs +type=crs"),
        3857 => Ok(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
             +units=m +nadgrids=@null +no_defs +type=crs",
        ),
        _ => bail!("Unsupported EPSG code: {epsg}"),
    }
}

#[inline]
fn is_geographic(epsg: u32) -> bool {
    matches!(epsg, 4326 | 4269)
}

/// Reproject every record of `layer` from `source_epsg` into `target_epsg`.
/// The target must be a planar CRS; intersection testing and area are
/// meaningless in degrees.
pub fn reproject_layer(layer: &mut GeomLayer, source_epsg: u32, target_epsg: u32) -> Result<()> {
    if is_geographic(target_epsg) {
        bail!("Target CRS must be planar, got EPSG:{target_epsg}");
    }
    if source_epsg == target_epsg {
        return Ok(());
    }

    let from = {
        let proj_string = epsg_to_proj4(source_epsg)?;
        Proj4::from_proj_string(proj_string)
            .with_context(|| anyhow!("failed to build source PROJ.4: {proj_string}"))?
    };
    let to = {
        let proj_string = epsg_to_proj4(target_epsg)?;
        Proj4::from_proj_string(proj_string)
            .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?
    };
    let radians_in = is_geographic(source_epsg);

    for record in &mut layer.records {
        record.geom = reproject_geom(&record.geom, &from, &to, radians_in)?;
    }
    Ok(())
}

fn reproject_geom(
    geom: &MultiPolygon<f64>,
    from: &Proj4,
    to: &Proj4,
    radians_in: bool,
) -> Result<MultiPolygon<f64>> {
    geom.try_map_coords(|coord: Coord<f64>| {
        let mut point = if radians_in {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(from, to, &mut point).map_err(|e| anyhow!("CRS transform failed: {e}"))?;
        Ok(Coord { x: point.0, y: point.1 })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerRecord;
    use ahash::AHashMap;
    use geo::Rect;

    #[test]
    fn wgs84_to_web_mercator_matches_known_points() {
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 90.0, y: 45.0 });
        let mut layer = GeomLayer::new(
            "t",
            vec![LayerRecord::new(MultiPolygon(vec![rect.to_polygon()]), AHashMap::new())],
        );
        reproject_layer(&mut layer, 4326, 3857).unwrap();

        let projected = layer.records[0].geom.0[0].exterior();
        let xs: Vec<f64> = projected.coords().map(|c| c.x).collect();
        let ys: Vec<f64> = projected.coords().map(|c| c.y).collect();
        // lon 90 -> a * pi/2; lat 45 -> 5621521.49 m
        let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
        let max_y = ys.iter().cloned().fold(f64::MIN, f64::max);
        assert!((max_x - 10_018_754.17).abs() < 1.0, "max_x = {max_x}");
        assert!((max_y - 5_621_521.49).abs() < 1.0, "max_y = {max_y}");
    }

    #[test]
    fn same_crs_is_a_no_op() {
        let rect = Rect::new(Coord { x: 1.0, y: 2.0 }, Coord { x: 3.0, y: 4.0 });
        let geom = MultiPolygon(vec![rect.to_polygon()]);
        let mut layer =
            GeomLayer::new("t", vec![LayerRecord::new(geom.clone(), AHashMap::new())]);
        reproject_layer(&mut layer, 3857, 3857).unwrap();
        assert_eq!(layer.records[0].geom, geom);
    }

    #[test]
    fn geographic_target_is_rejected() {
        let mut layer = GeomLayer::new("t", vec![]);
        assert!(reproject_layer(&mut layer, 3857, 4326).is_err());
    }

    #[test]
    fn unknown_epsg_is_an_input_error() {
        let mut layer = GeomLayer::new("t", vec![]);
        assert!(reproject_layer(&mut layer, 9999, 3857).is_err());
    }
}
