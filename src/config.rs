//! Run configuration. One `Params` value is built per run (from defaults,
//! a JSON file, CLI flags, or a mix) and threaded through the pipelines;
//! nothing is configured through globals.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Contour,
    Mesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Fixed,
    Variable,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LapseSource {
    #[default]
    Color,
    Bw,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    pub reduction: Reduction,
    /// Fixed/hybrid reduction: edges merged per output edge.
    pub r_len: u32,
    /// Variable/hybrid reduction: max deviation of dropped vertices.
    pub r_max_dist: f64,
    /// Endpoint distance for fusing and closing paths.
    pub path_fuse_dist: f64,
    /// Edge length floor for point fusing and small-polygon pruning.
    pub point_fuse_dist: f64,
    pub bw_thresh: u8,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            reduction: Reduction::Hybrid,
            r_len: 20,
            r_max_dist: 1.0,
            path_fuse_dist: 15.0,
            point_fuse_dist: 5.0,
            bw_thresh: 254,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    pub grid_h: usize,
    pub grid_v: usize,
    pub iterations: u32,
    pub bw_thresh: u8,
    pub min_e_len: f64,
    pub verbose: bool,
    pub timelapse: bool,
    pub lapse_source: LapseSource,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            grid_h: 20,
            grid_v: 20,
            iterations: 40,
            bw_thresh: 254,
            min_e_len: 3.0,
            verbose: false,
            timelapse: false,
            lapse_source: LapseSource::Color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Params {
    pub method: Method,
    pub contour: ContourParams,
    pub mesh: MeshParams,
}

pub fn params_from_json(text: &str) -> Result<Params, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let p = Params::default();
        assert_eq!(p.method, Method::Contour);
        assert_eq!(p.contour.reduction, Reduction::Hybrid);
        assert_eq!(p.contour.r_len, 20);
        assert_eq!(p.contour.bw_thresh, 254);
        assert_eq!((p.mesh.grid_h, p.mesh.grid_v), (20, 20));
        assert_eq!(p.mesh.iterations, 40);
        assert_eq!(p.mesh.min_e_len, 3.0);
    }

    #[test]
    fn params_deserialize_sample_json() {
        let sample = r#"
        {
            "method": "mesh",
            "contour": {
                "reduction": "variable",
                "r_max_dist": 2.5,
                "bw_thresh": 200
            },
            "mesh": {
                "grid_h": 12,
                "grid_v": 16,
                "iterations": 25,
                "timelapse": true,
                "lapse_source": "bw"
            }
        }
        "#;

        let p = params_from_json(sample).expect("sample json should deserialize");

        assert_eq!(p.method, Method::Mesh);
        assert_eq!(p.contour.reduction, Reduction::Variable);
        assert_eq!(p.contour.r_max_dist, 2.5);
        assert_eq!(p.contour.bw_thresh, 200);
        // Omitted fields keep their defaults.
        assert_eq!(p.contour.r_len, 20);
        assert_eq!((p.mesh.grid_h, p.mesh.grid_v), (12, 16));
        assert_eq!(p.mesh.iterations, 25);
        assert!(p.mesh.timelapse);
        assert_eq!(p.mesh.lapse_source, LapseSource::Bw);
        assert_eq!(p.mesh.min_e_len, 3.0);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(params_from_json(r#"{ "method": "sorcery" }"#).is_err());
    }
}
