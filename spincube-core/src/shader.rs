/// Shader sources for the flat and lit cube, embedded or loaded from disk
use std::fmt;
use std::path::Path;

use crate::config::Shading;
use crate::error::{Error, Result};

pub const ATTR_POSITION: &str = "aVertexPosition";
pub const ATTR_COLOR: &str = "aVertexColor";
pub const ATTR_NORMAL: &str = "aVertexNormal";

pub const VERTEX_FILE: &str = "cube.vert";
pub const FRAGMENT_FILE: &str = "cube.frag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Matrix uniforms consumed by the cube shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniform {
    Projection,
    ModelView,
    Normal,
}

impl Uniform {
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Projection => "uProjectionMatrix",
            Uniform::ModelView => "uModelViewMatrix",
            Uniform::Normal => "uNormalMatrix",
        }
    }
}

const FLAT_VERTEX: &str = r#"
attribute vec4 aVertexPosition;
attribute vec4 aVertexColor;

uniform mat4 uModelViewMatrix;
uniform mat4 uProjectionMatrix;

varying lowp vec4 vColor;

void main(void) {
    gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
    vColor = aVertexColor;
}
"#;

const FLAT_FRAGMENT: &str = r#"
varying lowp vec4 vColor;

void main(void) {
    gl_FragColor = vColor;
}
"#;

const LIT_VERTEX: &str = r#"
attribute vec4 aVertexPosition;
attribute vec4 aVertexColor;
attribute vec3 aVertexNormal;

uniform mat4 uNormalMatrix;
uniform mat4 uModelViewMatrix;
uniform mat4 uProjectionMatrix;

varying lowp vec4 vColor;
varying highp vec3 vLighting;

void main(void) {
    gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
    vColor = aVertexColor;

    highp vec3 ambientLight = vec3(0.3, 0.3, 0.3);
    highp vec3 directionalLightColor = vec3(1, 1, 1);
    highp vec3 directionalVector = normalize(vec3(0.85, 0.8, 0.75));

    highp vec4 transformedNormal = uNormalMatrix * vec4(aVertexNormal, 1.0);
    highp float directional = max(dot(transformedNormal.xyz, directionalVector), 0.0);
    vLighting = ambientLight + (directionalLightColor * directional);
}
"#;

const LIT_FRAGMENT: &str = r#"
varying lowp vec4 vColor;
varying highp vec3 vLighting;

void main(void) {
    gl_FragColor = vec4(vColor.rgb * vLighting, vColor.a);
}
"#;

/// Vertex and fragment source text plus the shading model they implement.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    pub shading: Shading,
}

impl ShaderSources {
    /// Sources compiled into the binary.
    pub fn embedded(shading: Shading) -> Self {
        let (vertex, fragment) = match shading {
            Shading::Flat => (FLAT_VERTEX, FLAT_FRAGMENT),
            Shading::Lit => (LIT_VERTEX, LIT_FRAGMENT),
        };
        Self {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
            shading,
        }
    }

    /// Builds sources from text fetched elsewhere; empty text is rejected
    /// with a compile error for that stage.
    pub fn from_text(vertex: String, fragment: String, shading: Shading) -> Result<Self> {
        for (stage, text) in [(ShaderStage::Vertex, &vertex), (ShaderStage::Fragment, &fragment)] {
            if text.trim().is_empty() {
                return Err(Error::ShaderCompile {
                    stage,
                    log: "shader source is empty".to_string(),
                });
            }
        }
        Ok(Self {
            vertex,
            fragment,
            shading,
        })
    }

    /// Reads `cube.vert` and `cube.frag` from `dir`.
    pub fn load(dir: impl AsRef<Path>, shading: Shading) -> Result<Self> {
        let dir = dir.as_ref();
        let vertex = read_source(&dir.join(VERTEX_FILE))?;
        let fragment = read_source(&dir.join(FRAGMENT_FILE))?;
        tracing::debug!(dir = %dir.display(), "loaded shader sources");
        Self::from_text(vertex, fragment, shading)
    }

    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::ShaderFetch {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_embedded_sources_reference_uniforms() {
        let flat = ShaderSources::embedded(Shading::Flat);
        assert!(flat.vertex.contains(Uniform::Projection.name()));
        assert!(flat.vertex.contains(Uniform::ModelView.name()));
        assert!(!flat.vertex.contains(Uniform::Normal.name()));
        assert!(flat.vertex.contains(ATTR_POSITION));
        assert!(flat.vertex.contains(ATTR_COLOR));

        let lit = ShaderSources::embedded(Shading::Lit);
        assert!(lit.vertex.contains(Uniform::Normal.name()));
        assert!(lit.vertex.contains(ATTR_NORMAL));
        assert_eq!(lit.shading, Shading::Lit);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_FILE), "void main(void) { gl_Position = vec4(0.0); }").unwrap();
        fs::write(dir.path().join(FRAGMENT_FILE), "void main(void) { gl_FragColor = vec4(1.0); }").unwrap();

        let sources = ShaderSources::load(dir.path(), Shading::Flat).unwrap();
        assert!(sources.source(ShaderStage::Vertex).contains("gl_Position"));
        assert!(sources.source(ShaderStage::Fragment).contains("gl_FragColor"));
    }

    #[test]
    fn test_load_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_FILE), "void main(void) {}").unwrap();

        match ShaderSources::load(dir.path(), Shading::Flat) {
            Err(Error::ShaderFetch { path, .. }) => assert!(path.ends_with(FRAGMENT_FILE)),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_source_rejected() {
        let err = ShaderSources::from_text("  \n".to_string(), "x".to_string(), Shading::Flat)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
    }
}
