//! Slide timing graphs.
//!
//! A timing graph is the `p:timing` tree of a slide: a root parallel node, the
//! main sequence, and nested groups that eventually fire commands or effects
//! against shapes. Graphs are plain data. They are built whole, attached to a
//! slide (replacing any previous graph) and only rendered to markup when the
//! slide is written.

use std::fmt::Write as FmtWrite;

/// Role of a time node within the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    TmRoot,
    MainSeq,
    AfterEffect,
}

impl NodeType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::TmRoot => "tmRoot",
            Self::MainSeq => "mainSeq",
            Self::AfterEffect => "afterEffect",
        }
    }
}

/// Duration of a time node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Indefinite,
    Millis(u32),
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indefinite => f.write_str("indefinite"),
            Self::Millis(ms) => write!(f, "{}", ms),
        }
    }
}

/// What a node does to its targets when its active duration ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Hold,
    Remove,
}

impl Fill {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Remove => "remove",
        }
    }
}

/// Effect preset attached to an effect node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub id: u32,
    pub class: PresetClass,
    pub subtype: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetClass {
    /// Media commands (play, pause, stop)
    MediaCall,
}

impl PresetClass {
    fn as_str(&self) -> &'static str {
        match self {
            Self::MediaCall => "mediacall",
        }
    }
}

/// Attributes and children shared by every time container (`p:cTn`).
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTimeNode {
    pub id: u32,
    pub preset: Option<Preset>,
    pub duration: Option<Duration>,
    /// `restart="never"` on the root
    pub restart_never: bool,
    pub fill: Option<Fill>,
    pub node_type: Option<NodeType>,
    /// Start condition delay in milliseconds
    pub start_delay: Option<u32>,
    pub children: Vec<TimeNode>,
}

impl CommonTimeNode {
    fn new(id: u32) -> Self {
        Self {
            id,
            preset: None,
            duration: None,
            restart_never: false,
            fill: None,
            node_type: None,
            start_delay: None,
            children: Vec::new(),
        }
    }

    fn write_xml(&self, xml: &mut String) {
        let _ = write!(xml, r#"<p:cTn id="{}""#, self.id);
        if let Some(preset) = &self.preset {
            let _ = write!(
                xml,
                r#" presetID="{}" presetClass="{}" presetSubtype="{}""#,
                preset.id,
                preset.class.as_str(),
                preset.subtype
            );
        }
        if let Some(duration) = self.duration {
            let _ = write!(xml, r#" dur="{}""#, duration);
        }
        if self.restart_never {
            xml.push_str(r#" restart="never""#);
        }
        if let Some(fill) = self.fill {
            let _ = write!(xml, r#" fill="{}""#, fill.as_str());
        }
        if let Some(node_type) = self.node_type {
            let _ = write!(xml, r#" nodeType="{}""#, node_type.as_str());
        }

        if self.start_delay.is_none() && self.children.is_empty() {
            xml.push_str("/>");
            return;
        }
        xml.push('>');

        if let Some(delay) = self.start_delay {
            let _ = write!(xml, r#"<p:stCondLst><p:cond delay="{}"/></p:stCondLst>"#, delay);
        }
        if !self.children.is_empty() {
            xml.push_str("<p:childTnLst>");
            for child in &self.children {
                child.write_xml(xml);
            }
            xml.push_str("</p:childTnLst>");
        }
        xml.push_str("</p:cTn>");
    }
}

/// A node in the timing tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeNode {
    /// Children run in parallel (`p:par`)
    Parallel(CommonTimeNode),
    /// Children run one after another (`p:seq`)
    Sequence {
        node: CommonTimeNode,
        concurrent: bool,
        /// `nextAc="seek"`: advancing skips to the end of the current step
        seek_on_next: bool,
    },
    /// Calls a command on a shape (`p:cmd type="call"`)
    Command {
        command: String,
        behavior: CommonTimeNode,
        target_shape_id: u32,
    },
}

impl TimeNode {
    fn write_xml(&self, xml: &mut String) {
        match self {
            Self::Parallel(node) => {
                xml.push_str("<p:par>");
                node.write_xml(xml);
                xml.push_str("</p:par>");
            },
            Self::Sequence {
                node,
                concurrent,
                seek_on_next,
            } => {
                xml.push_str("<p:seq");
                if *concurrent {
                    xml.push_str(r#" concurrent="1""#);
                }
                if *seek_on_next {
                    xml.push_str(r#" nextAc="seek""#);
                }
                xml.push('>');
                node.write_xml(xml);
                xml.push_str("</p:seq>");
            },
            Self::Command {
                command,
                behavior,
                target_shape_id,
            } => {
                let _ = write!(
                    xml,
                    r#"<p:cmd type="call" cmd="{}"><p:cBhvr>"#,
                    crate::common::xml::escape_xml(command)
                );
                behavior.write_xml(xml);
                let _ = write!(
                    xml,
                    r#"<p:tgtEl><p:spTgt spid="{}"/></p:tgtEl></p:cBhvr></p:cmd>"#,
                    target_shape_id
                );
            },
        }
    }

    fn common(&self) -> &CommonTimeNode {
        match self {
            Self::Parallel(node) | Self::Sequence { node, .. } => node,
            Self::Command { behavior, .. } => behavior,
        }
    }

    fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a TimeNode)) {
        visitor(self);
        for child in &self.common().children {
            child.visit(visitor);
        }
    }
}

/// Hands out `cTn` ids in document order, starting at 1.
struct IdAllocator(u32);

impl IdAllocator {
    fn next(&mut self) -> CommonTimeNode {
        self.0 += 1;
        CommonTimeNode::new(self.0)
    }
}

/// The complete timing tree of one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingGraph {
    root: TimeNode,
}

impl TimingGraph {
    /// Graph that starts playing the media shape `shape_id` from its beginning
    /// as soon as the slide is shown.
    ///
    /// root (tmRoot) → main sequence → hold group → hold group → media call
    /// effect (after previous) → `playFrom(0.0)` on the shape.
    pub fn auto_play(shape_id: u32) -> Self {
        let mut ids = IdAllocator(0);

        let mut root = ids.next();
        root.duration = Some(Duration::Indefinite);
        root.restart_never = true;
        root.node_type = Some(NodeType::TmRoot);

        let mut main_seq = ids.next();
        main_seq.duration = Some(Duration::Indefinite);
        main_seq.node_type = Some(NodeType::MainSeq);

        let mut outer = ids.next();
        outer.fill = Some(Fill::Hold);
        outer.start_delay = Some(0);

        let mut inner = ids.next();
        inner.fill = Some(Fill::Hold);
        inner.start_delay = Some(0);

        let mut effect = ids.next();
        effect.preset = Some(Preset {
            id: 1,
            class: PresetClass::MediaCall,
            subtype: 0,
        });
        effect.fill = Some(Fill::Hold);
        effect.node_type = Some(NodeType::AfterEffect);
        effect.start_delay = Some(0);

        let mut behavior = ids.next();
        behavior.duration = Some(Duration::Millis(1));
        behavior.fill = Some(Fill::Hold);

        effect.children.push(TimeNode::Command {
            command: "playFrom(0.0)".to_string(),
            behavior,
            target_shape_id: shape_id,
        });
        inner.children.push(TimeNode::Parallel(effect));
        outer.children.push(TimeNode::Parallel(inner));
        main_seq.children.push(TimeNode::Parallel(outer));
        root.children.push(TimeNode::Sequence {
            node: main_seq,
            concurrent: true,
            seek_on_next: true,
        });

        Self {
            root: TimeNode::Parallel(root),
        }
    }

    /// Ids of every shape targeted by a command in this graph.
    pub fn target_shape_ids(&self) -> Vec<u32> {
        let mut targets = Vec::new();
        self.root.visit(&mut |node| {
            if let TimeNode::Command {
                target_shape_id, ..
            } = node
            {
                targets.push(*target_shape_id);
            }
        });
        targets
    }

    /// Number of time nodes, commands included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }

    /// Append the `p:timing` element to `xml`.
    pub fn write_xml(&self, xml: &mut String) {
        xml.push_str("<p:timing><p:tnLst>");
        self.root.write_xml(xml);
        xml.push_str("</p:tnLst></p:timing>");
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        self.write_xml(&mut xml);
        xml
    }
}
