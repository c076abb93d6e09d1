// src/core/design_system/utilities.rs
//! Built-in utility tables and rule generation.

use super::candidate::{CandidateValue, ParsedCandidate, UtilityRef};
use super::{DesignSystem, OutputRule};
use crate::core::contexts::find_closing;

type Declarations = &'static [(&'static str, &'static str)];

/// How a named value after a functional root is resolved
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    /// Multiples of `--spacing` in quarter steps, `px`, or `--spacing-*` keys
    Spacing,
    /// `1/2` as a percentage
    Fraction,
    /// Theme colours plus `inherit`, `current`, `transparent`; takes an alpha modifier
    Color,
    /// Keys of one theme namespace
    Theme(&'static str),
    Keywords(Declarations),
    Integer { suffix: &'static str },
    /// Explicit `N%`
    Percentage,
    /// Bare integer read as a percentage (`opacity-50`)
    Scaled,
    /// `16/9` as an aspect ratio
    Ratio,
    /// Grid line spans (`col-span-2`, `col-span-full`)
    Span,
    /// Track counts (`grid-cols-3`)
    Grid,
}

#[derive(Debug, Clone)]
pub struct Arm {
    pub kind: ValueKind,
    pub properties: &'static [&'static str],
}

/// A utility keyed by root that takes a value
#[derive(Debug, Clone)]
pub struct Functional {
    pub root: &'static str,
    pub arms: Vec<Arm>,
    /// Declarations for the root written alone (`border`, `rounded`)
    pub bare: Option<Declarations>,
    pub negative: bool,
}

fn utility(root: &'static str) -> Functional {
    Functional { root, arms: Vec::new(), bare: None, negative: false }
}

impl Functional {
    fn arm(mut self, kind: ValueKind, properties: &'static [&'static str]) -> Self {
        self.arms.push(Arm { kind, properties });
        self
    }

    fn bare(mut self, declarations: Declarations) -> Self {
        self.bare = Some(declarations);
        self
    }

    fn negative(mut self) -> Self {
        self.negative = true;
        self
    }
}

pub const STATIC_UTILITIES: &[(&str, Declarations)] = &[
    ("block", &[("display", "block")]),
    ("inline-block", &[("display", "inline-block")]),
    ("inline", &[("display", "inline")]),
    ("flex", &[("display", "flex")]),
    ("inline-flex", &[("display", "inline-flex")]),
    ("grid", &[("display", "grid")]),
    ("inline-grid", &[("display", "inline-grid")]),
    ("table", &[("display", "table")]),
    ("table-row", &[("display", "table-row")]),
    ("table-cell", &[("display", "table-cell")]),
    ("contents", &[("display", "contents")]),
    ("flow-root", &[("display", "flow-root")]),
    ("list-item", &[("display", "list-item")]),
    ("hidden", &[("display", "none")]),
    ("static", &[("position", "static")]),
    ("fixed", &[("position", "fixed")]),
    ("absolute", &[("position", "absolute")]),
    ("relative", &[("position", "relative")]),
    ("sticky", &[("position", "sticky")]),
    ("visible", &[("visibility", "visible")]),
    ("invisible", &[("visibility", "hidden")]),
    ("collapse", &[("visibility", "collapse")]),
    ("isolate", &[("isolation", "isolate")]),
    ("isolation-auto", &[("isolation", "auto")]),
    ("container", &[("width", "100%")]),
    ("flex-row", &[("flex-direction", "row")]),
    ("flex-row-reverse", &[("flex-direction", "row-reverse")]),
    ("flex-col", &[("flex-direction", "column")]),
    ("flex-col-reverse", &[("flex-direction", "column-reverse")]),
    ("flex-wrap", &[("flex-wrap", "wrap")]),
    ("flex-wrap-reverse", &[("flex-wrap", "wrap-reverse")]),
    ("flex-nowrap", &[("flex-wrap", "nowrap")]),
    ("flex-auto", &[("flex", "auto")]),
    ("flex-initial", &[("flex", "0 auto")]),
    ("flex-none", &[("flex", "none")]),
    ("grid-flow-row", &[("grid-auto-flow", "row")]),
    ("grid-flow-col", &[("grid-auto-flow", "column")]),
    ("grid-flow-dense", &[("grid-auto-flow", "dense")]),
    ("text-left", &[("text-align", "left")]),
    ("text-center", &[("text-align", "center")]),
    ("text-right", &[("text-align", "right")]),
    ("text-justify", &[("text-align", "justify")]),
    ("text-start", &[("text-align", "start")]),
    ("text-end", &[("text-align", "end")]),
    ("text-ellipsis", &[("text-overflow", "ellipsis")]),
    ("text-clip", &[("text-overflow", "clip")]),
    ("text-wrap", &[("text-wrap", "wrap")]),
    ("text-nowrap", &[("text-wrap", "nowrap")]),
    ("text-balance", &[("text-wrap", "balance")]),
    ("text-pretty", &[("text-wrap", "pretty")]),
    ("truncate", &[("overflow", "hidden"), ("text-overflow", "ellipsis"), ("white-space", "nowrap")]),
    ("uppercase", &[("text-transform", "uppercase")]),
    ("lowercase", &[("text-transform", "lowercase")]),
    ("capitalize", &[("text-transform", "capitalize")]),
    ("normal-case", &[("text-transform", "none")]),
    ("italic", &[("font-style", "italic")]),
    ("not-italic", &[("font-style", "normal")]),
    ("underline", &[("text-decoration-line", "underline")]),
    ("overline", &[("text-decoration-line", "overline")]),
    ("line-through", &[("text-decoration-line", "line-through")]),
    ("no-underline", &[("text-decoration-line", "none")]),
    ("antialiased", &[("-webkit-font-smoothing", "antialiased")]),
    ("subpixel-antialiased", &[("-webkit-font-smoothing", "auto")]),
    ("tabular-nums", &[("font-variant-numeric", "tabular-nums")]),
    ("lining-nums", &[("font-variant-numeric", "lining-nums")]),
    ("normal-nums", &[("font-variant-numeric", "normal")]),
    ("break-normal", &[("overflow-wrap", "normal"), ("word-break", "normal")]),
    ("break-words", &[("overflow-wrap", "break-word")]),
    ("break-all", &[("word-break", "break-all")]),
    ("break-keep", &[("word-break", "keep-all")]),
    ("sr-only", &[("position", "absolute"), ("width", "1px"), ("height", "1px"), ("overflow", "hidden")]),
    ("not-sr-only", &[("position", "static"), ("width", "auto"), ("height", "auto"), ("overflow", "visible")]),
    ("appearance-none", &[("appearance", "none")]),
    ("appearance-auto", &[("appearance", "auto")]),
    ("outline-hidden", &[("outline", "2px solid transparent")]),
    ("border-collapse", &[("border-collapse", "collapse")]),
    ("border-separate", &[("border-collapse", "separate")]),
    ("bg-clip-text", &[("background-clip", "text")]),
    ("transform-gpu", &[("transform", "translateZ(0)")]),
    ("transform-cpu", &[("transform", "var(--tw-rotate-x) var(--tw-rotate-y) var(--tw-skew-x) var(--tw-skew-y)")]),
    ("transform-none", &[("transform", "none")]),
    ("transform-3d", &[("transform-style", "preserve-3d")]),
    ("transform-flat", &[("transform-style", "flat")]),
    ("translate-none", &[("translate", "none")]),
    ("scale-none", &[("scale", "none")]),
    ("rotate-none", &[("rotate", "none")]),
    ("space-x-reverse", &[("--tw-space-x-reverse", "1")]),
    ("space-y-reverse", &[("--tw-space-y-reverse", "1")]),
    ("divide-x-reverse", &[("--tw-divide-x-reverse", "1")]),
    ("divide-y-reverse", &[("--tw-divide-y-reverse", "1")]),
    ("ring-inset", &[("--tw-ring-inset", "inset")]),
    ("bg-radial", &[("background-image", "radial-gradient(in oklab, var(--tw-gradient-stops))")]),
    ("bg-conic", &[("background-image", "conic-gradient(in oklab, var(--tw-gradient-stops))")]),
    ("scroll-auto", &[("scroll-behavior", "auto")]),
    ("scroll-smooth", &[("scroll-behavior", "smooth")]),
    ("snap-none", &[("scroll-snap-type", "none")]),
    ("snap-x", &[("scroll-snap-type", "x var(--tw-scroll-snap-strictness)")]),
    ("snap-y", &[("scroll-snap-type", "y var(--tw-scroll-snap-strictness)")]),
    ("snap-both", &[("scroll-snap-type", "both var(--tw-scroll-snap-strictness)")]),
    ("snap-mandatory", &[("--tw-scroll-snap-strictness", "mandatory")]),
    ("snap-proximity", &[("--tw-scroll-snap-strictness", "proximity")]),
    ("snap-start", &[("scroll-snap-align", "start")]),
    ("snap-end", &[("scroll-snap-align", "end")]),
    ("snap-center", &[("scroll-snap-align", "center")]),
    ("snap-align-none", &[("scroll-snap-align", "none")]),
    ("snap-normal", &[("scroll-snap-stop", "normal")]),
    ("snap-always", &[("scroll-snap-stop", "always")]),
    ("ordinal", &[("font-variant-numeric", "ordinal")]),
    ("slashed-zero", &[("font-variant-numeric", "slashed-zero")]),
    ("oldstyle-nums", &[("font-variant-numeric", "oldstyle-nums")]),
    ("proportional-nums", &[("font-variant-numeric", "proportional-nums")]),
    ("diagonal-fractions", &[("font-variant-numeric", "diagonal-fractions")]),
    ("stacked-fractions", &[("font-variant-numeric", "stacked-fractions")]),
    ("@container", &[("container-type", "inline-size")]),
    ("@container-normal", &[("container-type", "normal")]),
];

const AUTO: Declarations = &[("auto", "auto")];
const INSET_KEYWORDS: Declarations = &[("auto", "auto"), ("full", "100%")];
const WIDTH_KEYWORDS: Declarations = &[
    ("auto", "auto"), ("full", "100%"), ("screen", "100vw"), ("dvw", "100dvw"), ("svw", "100svw"),
    ("lvw", "100lvw"), ("min", "min-content"), ("max", "max-content"), ("fit", "fit-content"),
];
const MAX_WIDTH_KEYWORDS: Declarations = &[
    ("none", "none"), ("full", "100%"), ("screen", "100vw"), ("prose", "65ch"), ("min", "min-content"),
    ("max", "max-content"), ("fit", "fit-content"),
];
const HEIGHT_KEYWORDS: Declarations = &[
    ("auto", "auto"), ("full", "100%"), ("screen", "100vh"), ("dvh", "100dvh"), ("svh", "100svh"),
    ("lvh", "100lvh"), ("lh", "1lh"), ("min", "min-content"), ("max", "max-content"), ("fit", "fit-content"),
];
const SIZE_KEYWORDS: Declarations = &[
    ("auto", "auto"), ("full", "100%"), ("min", "min-content"), ("max", "max-content"), ("fit", "fit-content"),
];
const TRANSLATE_KEYWORDS: Declarations = &[("full", "100%")];
const NONE: Declarations = &[("none", "none")];
const BORDER_STYLES: Declarations = &[
    ("solid", "solid"), ("dashed", "dashed"), ("dotted", "dotted"), ("double", "double"), ("hidden", "hidden"),
    ("none", "none"),
];
const RADIUS_KEYWORDS: Declarations = &[("none", "0"), ("full", "calc(infinity * 1px)")];
const LEADING_KEYWORDS: Declarations = &[("none", "1")];
const ORDER_KEYWORDS: Declarations = &[("first", "-9999"), ("last", "9999"), ("none", "0")];
const GRID_KEYWORDS: Declarations = &[("none", "none"), ("subgrid", "subgrid")];
const ASPECT_KEYWORDS: Declarations = &[("auto", "auto"), ("square", "1 / 1")];
const EASE_KEYWORDS: Declarations = &[("linear", "linear"), ("initial", "initial")];
const TRANSITION_KEYWORDS: Declarations = &[
    ("all", "all"), ("colors", "color, background-color, border-color, fill, stroke"), ("opacity", "opacity"),
    ("shadow", "box-shadow"), ("transform", "transform, translate, scale, rotate"), ("none", "none"),
];
const BG_IMAGE: Declarations = &[
    ("none", "none"),
    ("linear-to-t", "linear-gradient(to top, var(--tw-gradient-stops))"),
    ("linear-to-tr", "linear-gradient(to top right, var(--tw-gradient-stops))"),
    ("linear-to-r", "linear-gradient(to right, var(--tw-gradient-stops))"),
    ("linear-to-br", "linear-gradient(to bottom right, var(--tw-gradient-stops))"),
    ("linear-to-b", "linear-gradient(to bottom, var(--tw-gradient-stops))"),
    ("linear-to-bl", "linear-gradient(to bottom left, var(--tw-gradient-stops))"),
    ("linear-to-l", "linear-gradient(to left, var(--tw-gradient-stops))"),
    ("linear-to-tl", "linear-gradient(to top left, var(--tw-gradient-stops))"),
];
const BG_ATTACHMENT: Declarations = &[("fixed", "fixed"), ("local", "local"), ("scroll", "scroll")];
const BG_SIZE: Declarations = &[("auto", "auto"), ("cover", "cover"), ("contain", "contain")];
const BG_REPEAT: Declarations = &[
    ("repeat", "repeat"), ("no-repeat", "no-repeat"), ("repeat-x", "repeat-x"), ("repeat-y", "repeat-y"),
    ("repeat-round", "round"), ("repeat-space", "space"),
];
const POSITIONS: Declarations = &[
    ("center", "center"), ("top", "top"), ("bottom", "bottom"), ("left", "left"), ("right", "right"),
    ("top-left", "top left"), ("top-right", "top right"), ("bottom-left", "bottom left"),
    ("bottom-right", "bottom right"),
];
const OBJECT_FIT: Declarations = &[
    ("contain", "contain"), ("cover", "cover"), ("fill", "fill"), ("none", "none"), ("scale-down", "scale-down"),
];
const OVERFLOW: Declarations = &[
    ("auto", "auto"), ("hidden", "hidden"), ("clip", "clip"), ("visible", "visible"), ("scroll", "scroll"),
];
const OVERSCROLL: Declarations = &[("auto", "auto"), ("contain", "contain"), ("none", "none")];
const CURSORS: Declarations = &[
    ("auto", "auto"), ("default", "default"), ("pointer", "pointer"), ("wait", "wait"), ("text", "text"),
    ("move", "move"), ("help", "help"), ("not-allowed", "not-allowed"), ("none", "none"),
    ("progress", "progress"), ("cell", "cell"), ("crosshair", "crosshair"), ("grab", "grab"),
    ("grabbing", "grabbing"), ("zoom-in", "zoom-in"), ("zoom-out", "zoom-out"),
    ("col-resize", "col-resize"), ("row-resize", "row-resize"),
];
const POINTER_EVENTS: Declarations = &[("none", "none"), ("auto", "auto")];
const USER_SELECT: Declarations = &[("none", "none"), ("text", "text"), ("all", "all"), ("auto", "auto")];
const RESIZE: Declarations = &[("none", "none"), ("x", "horizontal"), ("y", "vertical")];
const LIST_TYPE: Declarations = &[("none", "none"), ("disc", "disc"), ("decimal", "decimal")];
const LIST_POSITION: Declarations = &[("inside", "inside"), ("outside", "outside")];
const WHITESPACE: Declarations = &[
    ("normal", "normal"), ("nowrap", "nowrap"), ("pre", "pre"), ("pre-line", "pre-line"),
    ("pre-wrap", "pre-wrap"), ("break-spaces", "break-spaces"),
];
const ALIGN_ITEMS: Declarations = &[
    ("start", "flex-start"), ("end", "flex-end"), ("center", "center"), ("baseline", "baseline"),
    ("stretch", "stretch"),
];
const DISTRIBUTE: Declarations = &[
    ("normal", "normal"), ("start", "flex-start"), ("end", "flex-end"), ("center", "center"),
    ("between", "space-between"), ("around", "space-around"), ("evenly", "space-evenly"),
    ("stretch", "stretch"), ("baseline", "baseline"),
];
const PLACE: Declarations = &[
    ("auto", "auto"), ("start", "start"), ("end", "end"), ("center", "center"), ("stretch", "stretch"),
    ("baseline", "baseline"),
];
const VERTICAL_ALIGN: Declarations = &[
    ("baseline", "baseline"), ("top", "top"), ("middle", "middle"), ("bottom", "bottom"),
    ("text-top", "text-top"), ("text-bottom", "text-bottom"), ("sub", "sub"), ("super", "super"),
];
const FLOAT: Declarations = &[
    ("left", "left"), ("right", "right"), ("start", "inline-start"), ("end", "inline-end"), ("none", "none"),
];
const CLEAR: Declarations = &[
    ("left", "left"), ("right", "right"), ("both", "both"), ("start", "inline-start"), ("end", "inline-end"),
    ("none", "none"),
];
const BOX_SIZING: Declarations = &[("border", "border-box"), ("content", "content-box")];
const BLEND_MODES: Declarations = &[
    ("normal", "normal"), ("multiply", "multiply"), ("screen", "screen"), ("overlay", "overlay"),
    ("darken", "darken"), ("lighten", "lighten"), ("difference", "difference"), ("exclusion", "exclusion"),
    ("color-dodge", "color-dodge"), ("color-burn", "color-burn"), ("hard-light", "hard-light"),
    ("soft-light", "soft-light"), ("hue", "hue"), ("saturation", "saturation"), ("color", "color"),
    ("luminosity", "luminosity"), ("plus-darker", "plus-darker"), ("plus-lighter", "plus-lighter"),
];
const TABLE_LAYOUT: Declarations = &[("auto", "auto"), ("fixed", "fixed")];
const DECORATION_STYLE: Declarations = &[
    ("solid", "solid"), ("double", "double"), ("dotted", "dotted"), ("dashed", "dashed"), ("wavy", "wavy"),
];
const DECORATION_THICKNESS: Declarations = &[("auto", "auto"), ("from-font", "from-font")];
const WILL_CHANGE: Declarations = &[
    ("auto", "auto"), ("scroll", "scroll-position"), ("contents", "contents"), ("transform", "transform"),
];
const CONTENT: Declarations = &[("none", "none")];
const TOUCH_ACTION: Declarations = &[
    ("auto", "auto"), ("none", "none"), ("pan-x", "pan-x"), ("pan-left", "pan-left"), ("pan-right", "pan-right"),
    ("pan-y", "pan-y"), ("pan-up", "pan-up"), ("pan-down", "pan-down"), ("pinch-zoom", "pinch-zoom"),
    ("manipulation", "manipulation"),
];
const HYPHENS: Declarations = &[("none", "none"), ("manual", "manual"), ("auto", "auto")];
const CAPTION_SIDE: Declarations = &[("top", "top"), ("bottom", "bottom")];
const FORCED_COLOR_ADJUST: Declarations = &[("auto", "auto"), ("none", "none")];
const BACKFACE: Declarations = &[("visible", "visible"), ("hidden", "hidden")];
const AUTO_TRACKS: Declarations = &[
    ("auto", "auto"), ("min", "min-content"), ("max", "max-content"), ("fr", "minmax(0, 1fr)"),
];
const BREAK_INSIDE: Declarations = &[
    ("auto", "auto"), ("avoid", "avoid"), ("avoid-page", "avoid-page"), ("avoid-column", "avoid-column"),
];
const BREAK_AROUND: Declarations = &[
    ("auto", "auto"), ("avoid", "avoid"), ("all", "all"), ("avoid-page", "avoid-page"), ("page", "page"),
    ("left", "left"), ("right", "right"), ("column", "column"),
];
const BOX_DECORATION: Declarations = &[("clone", "clone"), ("slice", "slice")];
const CONTAIN: Declarations = &[
    ("none", "none"), ("content", "content"), ("strict", "strict"), ("size", "size"),
    ("inline-size", "inline-size"), ("layout", "layout"), ("paint", "paint"), ("style", "style"),
];
const SCROLL_MARGIN: &[(&str, &[&str])] = &[
    ("scroll-m", &["scroll-margin"]),
    ("scroll-mx", &["scroll-margin-inline"]),
    ("scroll-my", &["scroll-margin-block"]),
    ("scroll-mt", &["scroll-margin-top"]),
    ("scroll-mr", &["scroll-margin-right"]),
    ("scroll-mb", &["scroll-margin-bottom"]),
    ("scroll-ml", &["scroll-margin-left"]),
    ("scroll-ms", &["scroll-margin-inline-start"]),
    ("scroll-me", &["scroll-margin-inline-end"]),
];
const SCROLL_PADDING: &[(&str, &[&str])] = &[
    ("scroll-p", &["scroll-padding"]),
    ("scroll-px", &["scroll-padding-inline"]),
    ("scroll-py", &["scroll-padding-block"]),
    ("scroll-pt", &["scroll-padding-top"]),
    ("scroll-pr", &["scroll-padding-right"]),
    ("scroll-pb", &["scroll-padding-bottom"]),
    ("scroll-pl", &["scroll-padding-left"]),
    ("scroll-ps", &["scroll-padding-inline-start"]),
    ("scroll-pe", &["scroll-padding-inline-end"]),
];

const BORDER_SIDES: &[(&str, &[&str], &[&str])] = &[
    ("border", &["border-width"], &["border-color"]),
    ("border-x", &["border-inline-width"], &["border-inline-color"]),
    ("border-y", &["border-block-width"], &["border-block-color"]),
    ("border-t", &["border-top-width"], &["border-top-color"]),
    ("border-r", &["border-right-width"], &["border-right-color"]),
    ("border-b", &["border-bottom-width"], &["border-bottom-color"]),
    ("border-l", &["border-left-width"], &["border-left-color"]),
    ("border-s", &["border-inline-start-width"], &["border-inline-start-color"]),
    ("border-e", &["border-inline-end-width"], &["border-inline-end-color"]),
];

const RADIUS_CORNERS: &[(&str, &[&str])] = &[
    ("rounded", &["border-radius"]),
    ("rounded-t", &["border-top-left-radius", "border-top-right-radius"]),
    ("rounded-r", &["border-top-right-radius", "border-bottom-right-radius"]),
    ("rounded-b", &["border-bottom-right-radius", "border-bottom-left-radius"]),
    ("rounded-l", &["border-top-left-radius", "border-bottom-left-radius"]),
    ("rounded-s", &["border-start-start-radius", "border-end-start-radius"]),
    ("rounded-e", &["border-start-end-radius", "border-end-end-radius"]),
    ("rounded-tl", &["border-top-left-radius"]),
    ("rounded-tr", &["border-top-right-radius"]),
    ("rounded-br", &["border-bottom-right-radius"]),
    ("rounded-bl", &["border-bottom-left-radius"]),
];

const PADDING: &[(&str, &[&str])] = &[
    ("p", &["padding"]),
    ("px", &["padding-inline"]),
    ("py", &["padding-block"]),
    ("pt", &["padding-top"]),
    ("pr", &["padding-right"]),
    ("pb", &["padding-bottom"]),
    ("pl", &["padding-left"]),
    ("ps", &["padding-inline-start"]),
    ("pe", &["padding-inline-end"]),
];

const MARGIN: &[(&str, &[&str])] = &[
    ("m", &["margin"]),
    ("mx", &["margin-inline"]),
    ("my", &["margin-block"]),
    ("mt", &["margin-top"]),
    ("mr", &["margin-right"]),
    ("mb", &["margin-bottom"]),
    ("ml", &["margin-left"]),
    ("ms", &["margin-inline-start"]),
    ("me", &["margin-inline-end"]),
];

const INSET: &[(&str, &[&str])] = &[
    ("inset", &["inset"]),
    ("inset-x", &["inset-inline"]),
    ("inset-y", &["inset-block"]),
    ("top", &["top"]),
    ("right", &["right"]),
    ("bottom", &["bottom"]),
    ("left", &["left"]),
    ("start", &["inset-inline-start"]),
    ("end", &["inset-inline-end"]),
];

/// Every built-in functional utility
pub fn functional_utilities() -> Vec<Functional> {
    use ValueKind::*;

    let mut utilities = Vec::new();

    for &(root, properties) in PADDING {
        utilities.push(utility(root).arm(Spacing, properties));
    }
    for &(root, properties) in MARGIN {
        utilities.push(utility(root).arm(Spacing, properties).arm(Keywords(AUTO), properties).negative());
    }
    for &(root, properties) in SCROLL_MARGIN {
        utilities.push(utility(root).arm(Spacing, properties).negative());
    }
    for &(root, properties) in SCROLL_PADDING {
        utilities.push(utility(root).arm(Spacing, properties));
    }
    for &(root, properties) in INSET {
        utilities.push(
            utility(root)
                .arm(Spacing, properties)
                .arm(Fraction, properties)
                .arm(Keywords(INSET_KEYWORDS), properties)
                .negative(),
        );
    }
    for &(root, width, color) in BORDER_SIDES {
        utilities.push(
            utility(root)
                .arm(Integer { suffix: "px" }, width)
                .arm(Color, color)
                .bare(&[("border-style", "var(--tw-border-style)"), ("border-width", "1px")]),
        );
    }
    for &(root, properties) in RADIUS_CORNERS {
        utilities.push(
            utility(root)
                .arm(Theme("radius"), properties)
                .arm(Keywords(RADIUS_KEYWORDS), properties)
                .bare(&[("border-radius", "0.25rem")]),
        );
    }

    utilities.extend([
        utility("gap").arm(Spacing, &["gap"]),
        utility("gap-x").arm(Spacing, &["column-gap"]),
        utility("gap-y").arm(Spacing, &["row-gap"]),
        utility("space-x").arm(Spacing, &["margin-inline-start"]).negative(),
        utility("space-y").arm(Spacing, &["margin-block-start"]).negative(),
        utility("w")
            .arm(Spacing, &["width"])
            .arm(Fraction, &["width"])
            .arm(Keywords(WIDTH_KEYWORDS), &["width"])
            .arm(Theme("container"), &["width"]),
        utility("min-w")
            .arm(Spacing, &["min-width"])
            .arm(Fraction, &["min-width"])
            .arm(Keywords(WIDTH_KEYWORDS), &["min-width"])
            .arm(Theme("container"), &["min-width"]),
        utility("max-w")
            .arm(Spacing, &["max-width"])
            .arm(Fraction, &["max-width"])
            .arm(Keywords(MAX_WIDTH_KEYWORDS), &["max-width"])
            .arm(Theme("container"), &["max-width"]),
        utility("h")
            .arm(Spacing, &["height"])
            .arm(Fraction, &["height"])
            .arm(Keywords(HEIGHT_KEYWORDS), &["height"]),
        utility("min-h")
            .arm(Spacing, &["min-height"])
            .arm(Fraction, &["min-height"])
            .arm(Keywords(HEIGHT_KEYWORDS), &["min-height"]),
        utility("max-h")
            .arm(Spacing, &["max-height"])
            .arm(Fraction, &["max-height"])
            .arm(Keywords(HEIGHT_KEYWORDS), &["max-height"]),
        utility("size")
            .arm(Spacing, &["width", "height"])
            .arm(Fraction, &["width", "height"])
            .arm(Keywords(SIZE_KEYWORDS), &["width", "height"]),
        utility("basis")
            .arm(Spacing, &["flex-basis"])
            .arm(Fraction, &["flex-basis"])
            .arm(Keywords(SIZE_KEYWORDS), &["flex-basis"])
            .arm(Theme("container"), &["flex-basis"]),
        utility("translate-x")
            .arm(Spacing, &["--tw-translate-x"])
            .arm(Fraction, &["--tw-translate-x"])
            .arm(Keywords(TRANSLATE_KEYWORDS), &["--tw-translate-x"])
            .negative(),
        utility("translate-y")
            .arm(Spacing, &["--tw-translate-y"])
            .arm(Fraction, &["--tw-translate-y"])
            .arm(Keywords(TRANSLATE_KEYWORDS), &["--tw-translate-y"])
            .negative(),
        utility("translate-z").arm(Spacing, &["--tw-translate-z"]).negative(),
        utility("translate")
            .arm(Spacing, &["--tw-translate-x", "--tw-translate-y"])
            .arm(Fraction, &["--tw-translate-x", "--tw-translate-y"])
            .arm(Keywords(TRANSLATE_KEYWORDS), &["--tw-translate-x", "--tw-translate-y"])
            .negative(),
        utility("border-spacing").arm(Spacing, &["--tw-border-spacing-x", "--tw-border-spacing-y"]),
        utility("border-spacing-x").arm(Spacing, &["--tw-border-spacing-x"]),
        utility("border-spacing-y").arm(Spacing, &["--tw-border-spacing-y"]),
        utility("indent").arm(Spacing, &["text-indent"]).negative(),
        utility("flex").arm(Integer { suffix: "" }, &["flex"]).arm(Fraction, &["flex"]),
        utility("grow").arm(Integer { suffix: "" }, &["flex-grow"]).bare(&[("flex-grow", "1")]),
        utility("shrink").arm(Integer { suffix: "" }, &["flex-shrink"]).bare(&[("flex-shrink", "1")]),
        utility("order").arm(Integer { suffix: "" }, &["order"]).arm(Keywords(ORDER_KEYWORDS), &["order"]).negative(),
        utility("z").arm(Integer { suffix: "" }, &["z-index"]).arm(Keywords(AUTO), &["z-index"]).negative(),
        utility("grid-cols").arm(Grid, &["grid-template-columns"]).arm(Keywords(GRID_KEYWORDS), &["grid-template-columns"]),
        utility("grid-rows").arm(Grid, &["grid-template-rows"]).arm(Keywords(GRID_KEYWORDS), &["grid-template-rows"]),
        utility("col-span").arm(Span, &["grid-column"]),
        utility("row-span").arm(Span, &["grid-row"]),
        utility("col-start").arm(Integer { suffix: "" }, &["grid-column-start"]).arm(Keywords(AUTO), &["grid-column-start"]).negative(),
        utility("col-end").arm(Integer { suffix: "" }, &["grid-column-end"]).arm(Keywords(AUTO), &["grid-column-end"]).negative(),
        utility("row-start").arm(Integer { suffix: "" }, &["grid-row-start"]).arm(Keywords(AUTO), &["grid-row-start"]).negative(),
        utility("row-end").arm(Integer { suffix: "" }, &["grid-row-end"]).arm(Keywords(AUTO), &["grid-row-end"]).negative(),
        utility("columns").arm(Integer { suffix: "" }, &["columns"]).arm(Theme("container"), &["columns"]).arm(Keywords(AUTO), &["columns"]),
        utility("line-clamp").arm(Integer { suffix: "" }, &["-webkit-line-clamp"]).arm(Keywords(NONE), &["-webkit-line-clamp"]),
        utility("bg")
            .arm(Color, &["background-color"])
            .arm(Keywords(BG_IMAGE), &["background-image"])
            .arm(Keywords(BG_ATTACHMENT), &["background-attachment"])
            .arm(Keywords(BG_SIZE), &["background-size"])
            .arm(Keywords(BG_REPEAT), &["background-repeat"])
            .arm(Keywords(POSITIONS), &["background-position"]),
        utility("text").arm(Theme("text"), &["font-size"]).arm(Color, &["color"]),
        utility("from").arm(Color, &["--tw-gradient-from"]).arm(Percentage, &["--tw-gradient-from-position"]),
        utility("via").arm(Color, &["--tw-gradient-via"]).arm(Percentage, &["--tw-gradient-via-position"]),
        utility("to").arm(Color, &["--tw-gradient-to"]).arm(Percentage, &["--tw-gradient-to-position"]),
        utility("fill").arm(Color, &["fill"]).arm(Keywords(NONE), &["fill"]),
        utility("stroke").arm(Integer { suffix: "" }, &["stroke-width"]).arm(Color, &["stroke"]).arm(Keywords(NONE), &["stroke"]),
        utility("accent").arm(Color, &["accent-color"]).arm(Keywords(AUTO), &["accent-color"]),
        utility("caret").arm(Color, &["caret-color"]),
        utility("placeholder").arm(Color, &["--tw-placeholder-color"]),
        utility("decoration")
            .arm(Integer { suffix: "px" }, &["text-decoration-thickness"])
            .arm(Color, &["text-decoration-color"])
            .arm(Keywords(DECORATION_STYLE), &["text-decoration-style"])
            .arm(Keywords(DECORATION_THICKNESS), &["text-decoration-thickness"]),
        utility("underline-offset").arm(Integer { suffix: "px" }, &["text-underline-offset"]).arm(Keywords(AUTO), &["text-underline-offset"]).negative(),
        utility("border").arm(Keywords(BORDER_STYLES), &["border-style"]),
        utility("outline")
            .arm(Integer { suffix: "px" }, &["outline-width"])
            .arm(Color, &["outline-color"])
            .arm(Keywords(BORDER_STYLES), &["outline-style"])
            .bare(&[("outline-style", "var(--tw-outline-style)"), ("outline-width", "1px")]),
        utility("outline-offset").arm(Integer { suffix: "px" }, &["outline-offset"]).negative(),
        utility("ring")
            .arm(Integer { suffix: "px" }, &["--tw-ring-width"])
            .arm(Color, &["--tw-ring-color"])
            .bare(&[("--tw-ring-width", "1px")]),
        utility("ring-offset").arm(Integer { suffix: "px" }, &["--tw-ring-offset-width"]).arm(Color, &["--tw-ring-offset-color"]),
        utility("inset-ring")
            .arm(Integer { suffix: "px" }, &["--tw-inset-ring-width"])
            .arm(Color, &["--tw-inset-ring-color"])
            .bare(&[("--tw-inset-ring-width", "1px")]),
        utility("divide-x").arm(Integer { suffix: "px" }, &["border-inline-start-width"]).bare(&[("border-inline-start-width", "1px")]),
        utility("divide-y").arm(Integer { suffix: "px" }, &["border-top-width"]).bare(&[("border-top-width", "1px")]),
        utility("divide").arm(Color, &["border-color"]).arm(Keywords(BORDER_STYLES), &["border-style"]),
        utility("shadow")
            .arm(Theme("shadow"), &["box-shadow"])
            .arm(Color, &["--tw-shadow-color"])
            .arm(Keywords(NONE), &["box-shadow"])
            .bare(&[("box-shadow", "var(--tw-shadow-sm)")]),
        utility("inset-shadow")
            .arm(Theme("inset-shadow"), &["box-shadow"])
            .arm(Color, &["--tw-inset-shadow-color"])
            .arm(Keywords(NONE), &["box-shadow"]),
        utility("drop-shadow")
            .arm(Theme("drop-shadow"), &["filter"])
            .arm(Color, &["--tw-drop-shadow-color"])
            .arm(Keywords(NONE), &["filter"])
            .bare(&[("filter", "var(--tw-drop-shadow-sm)")]),
        utility("opacity").arm(Scaled, &["opacity"]),
        utility("font").arm(Theme("font"), &["font-family"]).arm(Theme("font-weight"), &["font-weight"]),
        utility("tracking").arm(Theme("tracking"), &["letter-spacing"]).negative(),
        utility("leading").arm(Theme("leading"), &["line-height"]).arm(Spacing, &["line-height"]).arm(Keywords(LEADING_KEYWORDS), &["line-height"]),
        utility("aspect").arm(Theme("aspect"), &["aspect-ratio"]).arm(Ratio, &["aspect-ratio"]).arm(Keywords(ASPECT_KEYWORDS), &["aspect-ratio"]),
        utility("blur").arm(Theme("blur"), &["--tw-blur"]).arm(Keywords(NONE), &["--tw-blur"]).bare(&[("--tw-blur", "blur(8px)")]),
        utility("bg-linear").arm(Integer { suffix: "deg" }, &["--tw-gradient-position"]).negative(),
        utility("backdrop-brightness").arm(Scaled, &["--tw-backdrop-brightness"]),
        utility("backdrop-contrast").arm(Scaled, &["--tw-backdrop-contrast"]),
        utility("backdrop-saturate").arm(Scaled, &["--tw-backdrop-saturate"]),
        utility("backdrop-opacity").arm(Scaled, &["--tw-backdrop-opacity"]),
        utility("backdrop-grayscale").arm(Scaled, &["--tw-backdrop-grayscale"]).bare(&[("--tw-backdrop-grayscale", "grayscale(100%)")]),
        utility("backdrop-invert").arm(Scaled, &["--tw-backdrop-invert"]).bare(&[("--tw-backdrop-invert", "invert(100%)")]),
        utility("backdrop-sepia").arm(Scaled, &["--tw-backdrop-sepia"]).bare(&[("--tw-backdrop-sepia", "sepia(100%)")]),
        utility("backdrop-hue-rotate").arm(Integer { suffix: "deg" }, &["--tw-backdrop-hue-rotate"]).negative(),
        utility("backdrop-blur").arm(Theme("blur"), &["--tw-backdrop-blur"]).arm(Keywords(NONE), &["--tw-backdrop-blur"]).bare(&[("--tw-backdrop-blur", "blur(8px)")]),
        utility("brightness").arm(Scaled, &["--tw-brightness"]),
        utility("contrast").arm(Scaled, &["--tw-contrast"]),
        utility("saturate").arm(Scaled, &["--tw-saturate"]),
        utility("grayscale").arm(Scaled, &["--tw-grayscale"]).bare(&[("--tw-grayscale", "grayscale(100%)")]),
        utility("invert").arm(Scaled, &["--tw-invert"]).bare(&[("--tw-invert", "invert(100%)")]),
        utility("sepia").arm(Scaled, &["--tw-sepia"]).bare(&[("--tw-sepia", "sepia(100%)")]),
        utility("hue-rotate").arm(Integer { suffix: "deg" }, &["--tw-hue-rotate"]).negative(),
        utility("scale").arm(Scaled, &["scale"]).negative(),
        utility("scale-x").arm(Scaled, &["--tw-scale-x"]).negative(),
        utility("scale-y").arm(Scaled, &["--tw-scale-y"]).negative(),
        utility("scale-z").arm(Scaled, &["--tw-scale-z"]).negative(),
        utility("rotate").arm(Integer { suffix: "deg" }, &["rotate"]).negative(),
        utility("rotate-x").arm(Integer { suffix: "deg" }, &["--tw-rotate-x"]).negative(),
        utility("rotate-y").arm(Integer { suffix: "deg" }, &["--tw-rotate-y"]).negative(),
        utility("rotate-z").arm(Integer { suffix: "deg" }, &["--tw-rotate-z"]).negative(),
        utility("skew-x").arm(Integer { suffix: "deg" }, &["--tw-skew-x"]).negative(),
        utility("skew-y").arm(Integer { suffix: "deg" }, &["--tw-skew-y"]).negative(),
        utility("perspective").arm(Theme("perspective"), &["perspective"]).arm(Keywords(NONE), &["perspective"]),
        utility("animate").arm(Theme("animate"), &["animation"]).arm(Keywords(NONE), &["animation"]),
        utility("ease").arm(Theme("ease"), &["transition-timing-function"]).arm(Keywords(EASE_KEYWORDS), &["transition-timing-function"]),
        utility("duration").arm(Integer { suffix: "ms" }, &["transition-duration"]),
        utility("delay").arm(Integer { suffix: "ms" }, &["transition-delay"]),
        utility("transition")
            .arm(Keywords(TRANSITION_KEYWORDS), &["transition-property"])
            .bare(&[("transition-property", "color, background-color, border-color, opacity, box-shadow, transform")]),
        utility("origin").arm(Keywords(POSITIONS), &["transform-origin"]),
        utility("object").arm(Keywords(OBJECT_FIT), &["object-fit"]).arm(Keywords(POSITIONS), &["object-position"]),
        utility("overflow").arm(Keywords(OVERFLOW), &["overflow"]),
        utility("overflow-x").arm(Keywords(OVERFLOW), &["overflow-x"]),
        utility("overflow-y").arm(Keywords(OVERFLOW), &["overflow-y"]),
        utility("overscroll").arm(Keywords(OVERSCROLL), &["overscroll-behavior"]),
        utility("overscroll-x").arm(Keywords(OVERSCROLL), &["overscroll-behavior-x"]),
        utility("overscroll-y").arm(Keywords(OVERSCROLL), &["overscroll-behavior-y"]),
        utility("cursor").arm(Keywords(CURSORS), &["cursor"]),
        utility("pointer-events").arm(Keywords(POINTER_EVENTS), &["pointer-events"]),
        utility("select").arm(Keywords(USER_SELECT), &["user-select"]),
        utility("resize").arm(Keywords(RESIZE), &["resize"]).bare(&[("resize", "both")]),
        utility("list").arm(Keywords(LIST_TYPE), &["list-style-type"]).arm(Keywords(LIST_POSITION), &["list-style-position"]),
        utility("whitespace").arm(Keywords(WHITESPACE), &["white-space"]),
        utility("items").arm(Keywords(ALIGN_ITEMS), &["align-items"]),
        utility("justify").arm(Keywords(DISTRIBUTE), &["justify-content"]),
        utility("justify-items").arm(Keywords(PLACE), &["justify-items"]),
        utility("justify-self").arm(Keywords(PLACE), &["justify-self"]),
        utility("content").arm(Keywords(DISTRIBUTE), &["align-content"]).arm(Keywords(CONTENT), &["content"]),
        utility("self").arm(Keywords(PLACE), &["align-self"]),
        utility("place-content").arm(Keywords(DISTRIBUTE), &["place-content"]),
        utility("place-items").arm(Keywords(PLACE), &["place-items"]),
        utility("place-self").arm(Keywords(PLACE), &["place-self"]),
        utility("align").arm(Keywords(VERTICAL_ALIGN), &["vertical-align"]),
        utility("float").arm(Keywords(FLOAT), &["float"]),
        utility("clear").arm(Keywords(CLEAR), &["clear"]),
        utility("box").arm(Keywords(BOX_SIZING), &["box-sizing"]),
        utility("mix-blend").arm(Keywords(BLEND_MODES), &["mix-blend-mode"]),
        utility("table").arm(Keywords(TABLE_LAYOUT), &["table-layout"]),
        utility("will-change").arm(Keywords(WILL_CHANGE), &["will-change"]),
        utility("perspective-origin").arm(Keywords(POSITIONS), &["perspective-origin"]),
        utility("backface").arm(Keywords(BACKFACE), &["backface-visibility"]),
        utility("auto-cols").arm(Keywords(AUTO_TRACKS), &["grid-auto-columns"]),
        utility("auto-rows").arm(Keywords(AUTO_TRACKS), &["grid-auto-rows"]),
        utility("bg-blend").arm(Keywords(BLEND_MODES), &["background-blend-mode"]),
        utility("touch").arm(Keywords(TOUCH_ACTION), &["touch-action"]),
        utility("hyphens").arm(Keywords(HYPHENS), &["hyphens"]),
        utility("caption").arm(Keywords(CAPTION_SIDE), &["caption-side"]),
        utility("forced-color-adjust").arm(Keywords(FORCED_COLOR_ADJUST), &["forced-color-adjust"]),
        utility("break-inside").arm(Keywords(BREAK_INSIDE), &["break-inside"]),
        utility("break-before").arm(Keywords(BREAK_AROUND), &["break-before"]),
        utility("break-after").arm(Keywords(BREAK_AROUND), &["break-after"]),
        utility("box-decoration").arm(Keywords(BOX_DECORATION), &["box-decoration-break"]),
        utility("contain").arm(Keywords(CONTAIN), &["contain"]),
    ]);

    utilities
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierKind {
    None,
    Opacity,
    LineHeight,
}

fn modifier_kind(kind: ValueKind) -> ModifierKind {
    match kind {
        ValueKind::Color => ModifierKind::Opacity,
        ValueKind::Theme("text") => ModifierKind::LineHeight,
        _ => ModifierKind::None,
    }
}

const TYPE_HINTS: &[&str] = &[
    "color", "length", "percentage", "number", "integer", "url", "image", "position", "size", "family-name",
    "line-width", "absolute-size", "relative-size", "angle", "ratio",
];

/// Generate the rules for one interpretation; empty when it compiles to nothing
pub fn compile(system: &DesignSystem, parsed: &ParsedCandidate) -> Vec<OutputRule> {
    let mut bodies: Vec<Vec<(String, String)>> = Vec::new();

    match &parsed.utility {
        UtilityRef::Static(name) => {
            if let Some(declarations) = system.custom_utilities.get(name) {
                bodies.push(declarations.clone());
            }
            if let Some(declarations) = system.static_utility(name) {
                bodies.push(owned(declarations));
            }
        }
        UtilityRef::Functional { root, value, modifier } => {
            if let Some(template) = system.custom_functional.get(root) {
                bodies.extend(expand_custom(system, template, value.as_ref(), modifier.as_ref(), parsed.negative));
            }
            if let Some(def) = system.functional(root) {
                bodies.extend(compile_functional(system, def, value.as_ref(), modifier.as_ref(), parsed.negative));
            }
        }
        UtilityRef::ArbitraryProperty { property, value } => {
            bodies.push(vec![(property.clone(), value.clone())]);
        }
    }

    bodies
        .into_iter()
        .filter(|declarations| !declarations.is_empty())
        .map(|declarations| {
            let mut rule = OutputRule {
                selector: format!(".{}", escape_class(&parsed.raw)),
                at_rules: Vec::new(),
                declarations,
            };
            if parsed.important {
                for (_, value) in &mut rule.declarations {
                    value.push_str(" !important");
                }
            }
            for variant in parsed.variants.iter().rev() {
                variant.apply(&mut rule);
            }
            rule
        })
        .collect()
}

fn owned(declarations: Declarations) -> Vec<(String, String)> {
    declarations.iter().map(|(p, v)| (p.to_string(), v.to_string())).collect()
}

fn compile_functional(
    system: &DesignSystem,
    def: &Functional,
    value: Option<&CandidateValue>,
    modifier: Option<&CandidateValue>,
    negative: bool,
) -> Option<Vec<(String, String)>> {
    if negative && !def.negative {
        return None;
    }
    let Some(value) = value else {
        if modifier.is_some() || negative {
            return None;
        }
        return def.bare.map(owned);
    };

    let (arm, css) = match value {
        CandidateValue::Named(name) => def.arms.iter().find_map(|arm| {
            if negative && matches!(arm.kind, ValueKind::Color | ValueKind::Keywords(_)) {
                return None;
            }
            resolve_named(arm.kind, name, system).map(|css| (arm, css))
        })?,
        CandidateValue::Arbitrary(raw) => arbitrary_arm(&def.arms, raw)?,
    };

    let css = if negative { format!("calc({css} * -1)") } else { css };
    let mut declarations: Vec<(String, String)> =
        arm.properties.iter().map(|property| (property.to_string(), css.clone())).collect();

    match (modifier, modifier_kind(arm.kind)) {
        (None, _) => {}
        (Some(modifier), ModifierKind::Opacity) => {
            let alpha = opacity(modifier)?;
            for (_, value) in &mut declarations {
                *value = format!("color-mix(in oklab, {value} {alpha}, transparent)");
            }
        }
        (Some(modifier), ModifierKind::LineHeight) => {
            declarations.push(("line-height".to_string(), line_height(modifier, system)?));
        }
        (Some(_), ModifierKind::None) => return None,
    }

    Some(declarations)
}

fn resolve_named(kind: ValueKind, value: &str, system: &DesignSystem) -> Option<String> {
    match kind {
        ValueKind::Spacing => {
            if value == "px" {
                return Some("1px".to_string());
            }
            if let Some(themed) = system.theme.get("spacing", value) {
                return Some(themed.to_string());
            }
            is_spacing_multiple(value).then(|| format!("calc(var(--spacing) * {value})"))
        }
        ValueKind::Fraction => fraction(value).map(|(a, b)| format!("calc({a}/{b} * 100%)")),
        ValueKind::Color => match value {
            "inherit" => Some("inherit".to_string()),
            "current" => Some("currentcolor".to_string()),
            "transparent" => Some("transparent".to_string()),
            _ => system.theme.get("color", value).map(str::to_string),
        },
        ValueKind::Theme(namespace) => system.theme.get(namespace, value).map(str::to_string),
        ValueKind::Keywords(words) => words.iter().find(|(word, _)| *word == value).map(|(_, css)| css.to_string()),
        ValueKind::Integer { suffix } => is_integer(value).then(|| format!("{value}{suffix}")),
        ValueKind::Percentage => value
            .strip_suffix('%')
            .filter(|number| is_number(number))
            .map(|_| value.to_string()),
        ValueKind::Scaled => is_integer(value).then(|| format!("{value}%")),
        ValueKind::Ratio => fraction(value).map(|(a, b)| format!("{a} / {b}")),
        ValueKind::Span => match value {
            "full" => Some("1 / -1".to_string()),
            _ => is_integer(value).then(|| format!("span {value} / span {value}")),
        },
        ValueKind::Grid => is_integer(value).then(|| format!("repeat({value}, minmax(0, 1fr))")),
    }
}

/// Pick the arm an arbitrary value belongs to, honouring `[color:...]` style hints
fn arbitrary_arm<'a>(arms: &'a [Arm], raw: &str) -> Option<(&'a Arm, String)> {
    let (hint, value) = match raw.split_once(':') {
        Some((hint, value)) if TYPE_HINTS.contains(&hint) => (Some(hint), value),
        _ => (None, raw),
    };
    if value.is_empty() {
        return None;
    }

    let is_color = |arm: &&Arm| matches!(arm.kind, ValueKind::Color);
    let arm = match hint {
        Some("color") => arms.iter().find(is_color)?,
        Some(_) => arms.iter().find(|arm| !is_color(arm))?,
        None if looks_like_color(value) => arms.iter().find(is_color).or_else(|| arms.first())?,
        None => arms.iter().find(|arm| !is_color(arm)).or_else(|| arms.first())?,
    };
    Some((arm, value.to_string()))
}

fn looks_like_color(value: &str) -> bool {
    value.starts_with('#')
        || ["rgb", "hsl", "oklch", "oklab", "lab(", "lch(", "hwb(", "color(", "color-mix(", "var(--color"]
            .iter()
            .any(|prefix| value.starts_with(prefix))
}

fn opacity(modifier: &CandidateValue) -> Option<String> {
    match modifier {
        CandidateValue::Named(n) => {
            let percent: u32 = n.parse().ok()?;
            (percent <= 100 && is_integer(n)).then(|| format!("{percent}%"))
        }
        CandidateValue::Arbitrary(raw) => Some(raw.clone()),
    }
}

fn line_height(modifier: &CandidateValue, system: &DesignSystem) -> Option<String> {
    match modifier {
        CandidateValue::Named(n) => system
            .theme
            .get("leading", n)
            .map(str::to_string)
            .or_else(|| is_spacing_multiple(n).then(|| format!("calc(var(--spacing) * {n})"))),
        CandidateValue::Arbitrary(raw) => Some(raw.clone()),
    }
}

/// Apply a `@utility name-*` template, substituting `--value()` and `--modifier()`.
/// Declarations whose functions cannot be resolved are dropped.
fn expand_custom(
    system: &DesignSystem,
    template: &[(String, String)],
    value: Option<&CandidateValue>,
    modifier: Option<&CandidateValue>,
    negative: bool,
) -> Option<Vec<(String, String)>> {
    if negative {
        return None;
    }
    let value = value?;
    if modifier.is_some() && !template.iter().any(|(_, css)| css.contains("--modifier(")) {
        return None;
    }

    let declarations: Vec<(String, String)> = template
        .iter()
        .filter_map(|(property, css)| {
            let css = substitute(css, "--value(", Some(value), system)?;
            let css = substitute(&css, "--modifier(", modifier, system)?;
            Some((property.clone(), css))
        })
        .collect();

    (!declarations.is_empty()).then_some(declarations)
}

fn substitute(css: &str, function: &str, value: Option<&CandidateValue>, system: &DesignSystem) -> Option<String> {
    let mut out = String::new();
    let mut rest = css;

    while let Some(start) = rest.find(function) {
        let body = start + function.len();
        let close = find_closing(rest, body, b'(', b')')?;
        let resolved = resolve_custom_value(&rest[body..close], value?, system)?;
        out.push_str(&rest[..start]);
        out.push_str(&resolved);
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Some(out)
}

/// First matching alternative of `--value(integer, --tab-size-*, [length])`
fn resolve_custom_value(args: &str, value: &CandidateValue, system: &DesignSystem) -> Option<String> {
    args.split(',').map(str::trim).find_map(|arg| match value {
        CandidateValue::Arbitrary(raw) => arg.starts_with('[').then(|| raw.clone()),
        CandidateValue::Named(name) => match arg {
            "integer" => is_integer(name).then(|| name.clone()),
            "number" => is_number(name).then(|| name.clone()),
            "percentage" => name
                .strip_suffix('%')
                .filter(|n| is_number(n))
                .map(|_| name.clone()),
            "ratio" => fraction(name).map(|(a, b)| format!("{a} / {b}")),
            quoted if quoted.len() >= 2 && (quoted.starts_with('"') || quoted.starts_with('\'')) => {
                (&quoted[1..quoted.len() - 1] == name.as_str()).then(|| name.clone())
            }
            variable => {
                let namespace = variable.strip_prefix("--")?.strip_suffix("-*")?;
                system.theme.variable(&format!("--{namespace}-{name}")).map(str::to_string)
            }
        },
    })
}

fn is_integer(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn is_number(text: &str) -> bool {
    match text.split_once('.') {
        Some((whole, fraction)) => is_integer(whole) && is_integer(fraction),
        None => is_integer(text),
    }
}

/// `4`, `0.5`, `2.75`: non-negative quarter steps
fn is_spacing_multiple(text: &str) -> bool {
    if !is_number(text) {
        return false;
    }
    text.parse::<f64>().map_or(false, |n| (n * 4.0).fract() == 0.0)
}

fn fraction(text: &str) -> Option<(u32, u32)> {
    let (numerator, denominator) = text.split_once('/')?;
    if !is_integer(numerator) || !is_integer(denominator) {
        return None;
    }
    let denominator: u32 = denominator.parse().ok()?;
    (denominator > 0).then_some((numerator.parse().ok()?, denominator))
}

/// Escape a class name for use in a selector
pub fn escape_class(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            escaped.push_str(&format!("\\3{c} "));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::design_system::ClassOracle;

    fn valid(candidate: &str) -> bool {
        DesignSystem::new().is_valid(candidate)
    }

    #[test]
    fn test_static_and_functional_utilities() {
        for candidate in ["flex", "items-center", "p-4", "px-0.5", "w-1/2", "bg-red-500", "text-lg", "rounded", "border-x-2"] {
            assert!(valid(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_v4_utility_coverage() {
        let classes = [
            "snap-x", "snap-y", "snap-mandatory", "snap-start", "snap-center", "snap-always",
            "scroll-smooth", "scroll-mt-4", "scroll-px-2", "-scroll-m-1",
            "touch-none", "touch-pan-x", "hyphens-auto", "bg-blend-multiply", "mix-blend-soft-light",
            "border-spacing-2", "border-spacing-x-1", "caption-bottom", "forced-color-adjust-auto",
            "bg-radial", "bg-conic", "bg-linear-45", "ring-inset",
            "backdrop-grayscale", "backdrop-brightness-50", "backdrop-hue-rotate-90", "backdrop-opacity-75",
            "translate-z-10", "-translate-z-2", "translate-1/2", "transform-3d", "transform-none",
            "rotate-x-45", "scale-z-90", "backface-hidden", "perspective-origin-top",
            "auto-cols-fr", "auto-rows-min", "space-y-reverse", "space-x-4",
            "break-inside-avoid", "break-after-page", "box-decoration-clone", "contain-size",
            "@container", "md:@container", "bg-(image:--my-bg)", "bg-(--brand)", "slashed-zero",
        ];
        let rejected: Vec<&str> = classes.into_iter().filter(|c| !valid(c)).collect();
        assert!(rejected.is_empty(), "{rejected:?}");
    }

    #[test]
    fn test_lookalikes_of_new_utilities_rejected() {
        for candidate in ["snap-sideways", "touch-pan", "hyphens-maybe", "contain-all", "-scroll-p-2", "bg-(image:brand)", "backface-4"] {
            assert!(!valid(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_legacy_and_malformed_utilities_rejected() {
        for candidate in ["bg-opacity-50", "text-opacity-25", "p-1.3", "bg-reddish", "flexx", "-p-4", "rounded-huge"] {
            assert!(!valid(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_modifiers() {
        assert!(valid("bg-red-500/50"));
        assert!(valid("bg-red-500/[0.35]"));
        assert!(!valid("bg-red-500/150"));
        assert!(valid("text-sm/6"));
        assert!(!valid("p-4/2"));
    }

    #[test]
    fn test_negative_values() {
        assert!(valid("-mt-4"));
        assert!(valid("-translate-x-1/2"));
        assert!(!valid("-bg-red-500"));
        assert!(!valid("-m-auto"));
    }

    #[test]
    fn test_arbitrary_values_and_properties() {
        assert!(valid("w-[calc(100%-2rem)]"));
        assert!(valid("bg-[#0f172a]"));
        assert!(valid("text-[color:var(--brand)]"));
        assert!(valid("[mask-type:luminance]"));
        assert!(!valid("cursor-[color:red]"));
    }

    #[test]
    fn test_variants_and_important() {
        assert!(valid("hover:bg-blue-600"));
        assert!(valid("md:max-lg:dark:group-hover:underline"));
        assert!(valid("!font-bold"));
        assert!(!valid("hovr:flex"));
    }

    #[test]
    fn test_compiled_rule_shape() {
        let system = DesignSystem::new();
        let parsed = system.parse("md:hover:p-4!");
        let rules: Vec<OutputRule> = parsed.iter().flat_map(|p| system.compile(p)).collect();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".md\\:hover\\:p-4\\!:hover");
        assert_eq!(rules[0].at_rules, vec!["@media (width >= 48rem)"]);
        assert_eq!(
            rules[0].declarations,
            vec![("padding".to_string(), "calc(var(--spacing) * 4) !important".to_string())]
        );
    }

    #[test]
    fn test_escape_class() {
        assert_eq!(escape_class("w-1/2"), "w-1\\/2");
        assert_eq!(escape_class("2xl:flex"), "\\32 xl\\:flex");
    }
}
