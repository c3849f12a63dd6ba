//! Configuration and constants for the CLI and the analysis core.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Marker separating class name from method name in a language frame
/// (e.g. `com.example.Foo//bar`). Frames without it are native frames.
pub const LANGUAGE_FRAME_MARKER: &str = "//";

/// Separator between frames on a collapsed stack line
pub const FRAME_SEPARATOR: char = ';';

/// Label of the synthetic root node in every display tree
pub const ROOT_LABEL: &str = "root";

/// Extension the profiler gives collapsed stack dumps
pub const COLLAPSED_EXTENSION: &str = "collapsed";

// One artifact per filter policy
pub const HOT_METHOD_FILE: &str = "hotMethod.json";
pub const LANGUAGE_HOT_METHOD_FILE: &str = "hotMethod-java.json";
pub const COMPACT_HOT_METHOD_FILE: &str = "hotMethod-java-compact.json";

/// Environment variable holding comma separated compactable class prefixes
pub const COMPACT_PREFIXES_ENV: &str = "HOTMETHOD_COMPACT_PREFIXES";

/// Class name prefixes treated as compactable when the host configures none.
///
/// These are framework, reflection and proxy layers whose consecutive
/// frames add depth to a hot method tree without adding information.
pub const DEFAULT_COMPACT_CLASS_PREFIXES: &[&str] = &[
    "java.lang.reflect.",
    "jdk.internal.reflect.",
    "sun.reflect.",
    "com.sun.proxy.",
    "jdk.proxy",
    "org.springframework.",
    "org.apache.catalina.",
    "org.apache.tomcat.",
    "org.apache.coyote.",
    "io.netty.",
    "com.google.common.",
];

/// Class name fragments that mark generated classes (CGLIB, Javassist, lambdas)
pub const DEFAULT_COMPACT_CLASS_FRAGMENTS: &[&str] =
    &["$$EnhancerBy", "$$FastClassBy", "$$Lambda", "_$$_javassist"];

/// Appended to a report's file name while it is being written
pub const STAGING_SUFFIX: &str = ".tmp";

/// Upper bound for `--top-methods`
pub const MAX_TOP_METHODS: usize = 1000;
