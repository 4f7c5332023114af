//! Home.xml parsing.
//!
//! Two passes: `quick-xml` events are folded into an [`XmlElement`] tree, then
//! the tree is converted into typed nodes. Missing or malformed geometry
//! attributes abort the parse; a home without valid dimensions cannot be
//! placed.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::types::*;

/// Errors that can occur while parsing a home document.
#[derive(Error, Debug)]
pub enum HomeError {
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Document has no root element")]
    EmptyDocument,

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> attribute `{attribute}` has invalid value {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
}

/// Result type for parsing operations.
pub type HomeResult<T> = Result<T, HomeError>;

/// A generic XML element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    fn required(&self, key: &str) -> HomeResult<&str> {
        self.attr(key).ok_or_else(|| HomeError::MissingAttribute {
            element: self.tag.clone(),
            attribute: key.to_string(),
        })
    }

    fn invalid(&self, key: &str, value: &str) -> HomeError {
        HomeError::InvalidAttribute {
            element: self.tag.clone(),
            attribute: key.to_string(),
            value: value.to_string(),
        }
    }

    fn required_f32(&self, key: &str) -> HomeResult<f32> {
        let value = self.required(key)?;
        value.trim().parse().map_err(|_| self.invalid(key, value))
    }

    fn optional_f32(&self, key: &str) -> HomeResult<Option<f32>> {
        self.attr(key)
            .map(|value| value.trim().parse().map_err(|_| self.invalid(key, value)))
            .transpose()
    }

    fn optional_color(&self, key: &str) -> HomeResult<Option<Color>> {
        self.attr(key)
            .map(|value| Color::parse_argb(value).ok_or_else(|| self.invalid(key, value)))
            .transpose()
    }

    /// `"true"` is true, anything else (or absence) is `default`.
    fn flag(&self, key: &str, default: bool) -> bool {
        match self.attr(key) {
            Some(value) => value == "true",
            None => default,
        }
    }

    fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

/// Parse XML text into an element tree and return the root.
pub fn parse_xml(content: &str) -> HomeResult<XmlElement> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        let event = reader.read_event().map_err(|e| HomeError::Xml {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => stack.push(element_from(&start, &reader)?),
            Event::Empty(start) => {
                let element = element_from(&start, &reader)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml already checked the end tag matches
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(HomeError::Unclosed(open.tag));
    }
    root.ok_or(HomeError::EmptyDocument)
}

fn element_from(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> HomeResult<XmlElement> {
    let xml_error = |message: String| HomeError::Xml {
        position: reader.buffer_position() as u64,
        message,
    };

    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        tag,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            } else {
                log::warn!("Ignoring extra top-level element <{}>", element.tag);
            }
        }
    }
}

/// Parse a complete home document.
pub fn parse_home(content: &str) -> HomeResult<HomeDocument> {
    let root = parse_xml(content)?;
    home_from_element(&root)
}

/// Convert an already parsed root element.
pub fn home_from_element(root: &XmlElement) -> HomeResult<HomeDocument> {
    if root.tag != "home" {
        log::warn!("Unexpected root element <{}>, expected <home>", root.tag);
    }

    Ok(HomeDocument {
        name: root.attr("name").map(str::to_string),
        structure: root.attr("structure").map(str::to_string),
        nodes: parse_nodes(&root.children)?,
    })
}

fn parse_nodes(elements: &[XmlElement]) -> HomeResult<Vec<HomeNode>> {
    elements.iter().map(parse_node).collect()
}

fn parse_node(element: &XmlElement) -> HomeResult<HomeNode> {
    match element.tag.as_str() {
        "level" => Ok(HomeNode::Level(parse_level(element)?)),
        "furnitureGroup" => Ok(HomeNode::FurnitureGroup(FurnitureGroup {
            name: element.attr("name").unwrap_or("Group").to_string(),
            visible: element.flag("visible", true),
            children: parse_nodes(&element.children)?,
        })),
        "observerCamera" => Ok(HomeNode::ObserverCamera(parse_camera(element)?)),
        _ if element.has_attr("model") => Ok(HomeNode::Piece(parse_piece(element)?)),
        other => Ok(HomeNode::Other(other.to_string())),
    }
}

fn parse_level(element: &XmlElement) -> HomeResult<Level> {
    Ok(Level {
        id: element.required("id")?.to_string(),
        name: element.attr("name").map(str::to_string),
        elevation: element.required_f32("elevation")?,
        floor_thickness: element.optional_f32("floorThickness")?.unwrap_or(0.0),
    })
}

fn parse_camera(element: &XmlElement) -> HomeResult<ObserverCamera> {
    let value = |key| element.optional_f32(key).map(|v| v.unwrap_or(0.0));
    Ok(ObserverCamera {
        attribute: element.attr("attribute").map(str::to_string),
        x: value("x")?,
        y: value("y")?,
        z: value("z")?,
        yaw: value("yaw")?,
        pitch: value("pitch")?,
    })
}

fn parse_piece(element: &XmlElement) -> HomeResult<Piece> {
    let model = element.required("model")?;
    let model = match urlencoding::decode(model) {
        Ok(decoded) => decoded,
        Err(_) => {
            log::warn!("Model path {model:?} is not valid percent-encoded UTF-8, using it as is");
            Cow::Borrowed(model)
        }
    }
    .into_owned();

    let model_rotation = element
        .attr("modelRotation")
        .map(|value| parse_matrix(value).ok_or_else(|| element.invalid("modelRotation", value)))
        .transpose()?;

    let category = PieceCategory::from_tag(&element.tag);
    let light = if category == PieceCategory::Light {
        Some(parse_light(element)?)
    } else {
        None
    };

    Ok(Piece {
        id: element.attr("id").map(str::to_string),
        name: element
            .attr("name")
            .unwrap_or(element.tag.as_str())
            .to_string(),
        category,
        model,
        x: element.required_f32("x")?,
        y: element.required_f32("y")?,
        elevation: element.optional_f32("elevation")?,
        width: element.required_f32("width")?,
        depth: element.required_f32("depth")?,
        height: element.required_f32("height")?,
        angle: element.optional_f32("angle")?,
        pitch: element.optional_f32("pitch")?,
        color: element.optional_color("color")?,
        model_mirrored: element.flag("modelMirrored", false),
        model_rotation,
        level: element.attr("level").map(str::to_string),
        visible: element.flag("visible", true),
        materials: element
            .children_tagged("material")
            .map(parse_material)
            .collect::<HomeResult<_>>()?,
        light,
    })
}

fn parse_matrix(value: &str) -> Option<[f32; 9]> {
    let values: Vec<f32> = value
        .split_whitespace()
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    values.try_into().ok()
}

fn parse_material(element: &XmlElement) -> HomeResult<PieceMaterial> {
    Ok(PieceMaterial {
        name: element.required("name")?.to_string(),
        color: element.optional_color("color")?,
        texture: element
            .children_tagged("texture")
            .find_map(|t| t.attr("image"))
            .map(str::to_string),
    })
}

fn parse_light(element: &XmlElement) -> HomeResult<LightInfo> {
    Ok(LightInfo {
        power: element.required_f32("power")?,
        sources: element
            .children_tagged("lightSource")
            .map(|source| -> HomeResult<LightSource> {
                Ok(LightSource {
                    x: source.required_f32("x")?,
                    y: source.required_f32("y")?,
                    z: source.required_f32("z")?,
                    color: source.optional_color("color")?,
                    diameter: source.optional_f32("diameter")?,
                })
            })
            .collect::<HomeResult<_>>()?,
    })
}
