//! Plugin registration for `abrz.AdaptiveBinarize`.

use crate::host::{ArgMap, Node, Plugin, PluginError, PluginMetadata};

use super::{AdaptiveBinarize, FILTER_NAME};

/// Reverse-domain identifier of the plugin.
pub const PLUGIN_IDENTIFIER: &str = "com.julek.abrz";

/// Namespace the filter is called through.
pub const PLUGIN_NAMESPACE: &str = "abrz";

const PLUGIN_NAME: &str = "Adaptive Binarize";

/// Argument schema of `AdaptiveBinarize`.
pub const FUNCTION_ARGS: &str = "clip:vnode;clip2:vnode;c:int:opt;";

/// Return schema of `AdaptiveBinarize`.
pub const FUNCTION_RETURNS: &str = "clip:vnode;";

fn required_node(args: &ArgMap, key: &str) -> Result<Node, PluginError> {
    args.get_node(key)?.ok_or_else(|| PluginError::MissingArgument {
        function: FILTER_NAME.to_string(),
        arg: key.to_string(),
    })
}

/// Builds the filter from an argument map.
///
/// `c` is optional and saturated into the `i32` range.
pub fn create(args: &ArgMap) -> Result<Node, PluginError> {
    let node = required_node(args, "clip")?;
    let node2 = required_node(args, "clip2")?;
    let c = args.get_int_saturated("c")?;

    Ok(AdaptiveBinarize::new(node, node2, c)?.into_node())
}

/// The `abrz` plugin with its single function registered.
pub fn plugin() -> Result<Plugin, PluginError> {
    let mut plugin = Plugin::new(PluginMetadata {
        identifier: PLUGIN_IDENTIFIER.to_string(),
        namespace: PLUGIN_NAMESPACE.to_string(),
        name: PLUGIN_NAME.to_string(),
        version: (1, 0),
    });
    plugin.register_function(FILTER_NAME, FUNCTION_ARGS, FUNCTION_RETURNS, create)?;
    Ok(plugin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;
    use crate::format::{VideoFormat, VideoInfo};
    use crate::host::{Core, MemoryClip};
    use crate::lut::DEFAULT_THRESHOLD;
    use std::sync::Arc;

    fn gray(width: usize, frames: usize, value: u32) -> Node {
        MemoryClip::blank(VideoInfo::new(VideoFormat::GRAY8, width, 4, frames), value).into_node()
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = plugin().unwrap();
        let meta = plugin.metadata();
        assert_eq!(meta.identifier, "com.julek.abrz");
        assert_eq!(meta.namespace, "abrz");
        assert_eq!(meta.name, "Adaptive Binarize");
        assert_eq!(meta.version, (1, 0));

        let function = plugin.function("AdaptiveBinarize").unwrap();
        assert_eq!(function.args.to_string(), FUNCTION_ARGS);
        assert_eq!(function.returns.to_string(), FUNCTION_RETURNS);
    }

    #[test]
    fn test_default_threshold_through_plugin() {
        let plugin = plugin().unwrap();
        // difference of exactly -3 binarizes at the default threshold
        let mut args = ArgMap::new();
        args.set_node("clip", gray(4, 1, 7)).set_node("clip2", gray(4, 1, 10));

        let node = plugin.invoke("AdaptiveBinarize", &args).unwrap();
        let frame = Core::new().get_frame(&node, 0).unwrap();
        let view = frame.plane(0).view::<u8>().unwrap();
        assert!(view.rows().flatten().all(|&v| v == 255));
        assert_eq!(DEFAULT_THRESHOLD, 3);
    }

    #[test]
    fn test_threshold_saturates() {
        let plugin = plugin().unwrap();
        let mut args = ArgMap::new();
        args.set_node("clip", gray(4, 1, 0))
            .set_node("clip2", gray(4, 1, 255))
            .set_int("c", i64::MAX);

        // no difference reaches -i32::MAX
        let node = plugin.invoke("AdaptiveBinarize", &args).unwrap();
        let frame = Core::new().get_frame(&node, 0).unwrap();
        let view = frame.plane(0).view::<u8>().unwrap();
        assert!(view.rows().flatten().all(|&v| v == 0));

        args.set_int("c", i64::MIN);
        let node = plugin.invoke("AdaptiveBinarize", &args).unwrap();
        let frame = Core::new().get_frame(&node, 0).unwrap();
        let view = frame.plane(0).view::<u8>().unwrap();
        assert!(view.rows().flatten().all(|&v| v == 255));
    }

    #[test]
    fn test_invoke_rejects_and_releases() {
        let plugin = plugin().unwrap();
        let clip = gray(4, 2, 0);
        let clip2 = gray(8, 2, 0);
        let mut args = ArgMap::new();
        args.set_node("clip", Arc::clone(&clip)).set_node("clip2", Arc::clone(&clip2));

        let err = plugin.invoke("AdaptiveBinarize", &args).unwrap_err();
        assert!(matches!(err, PluginError::Filter(FilterError::FormatMismatch)));
        assert_eq!(
            err.to_string(),
            "AdaptiveBinarize: both clips must have the same format and dimensions"
        );

        drop(args);
        assert_eq!(Arc::strong_count(&clip), 1);
        assert_eq!(Arc::strong_count(&clip2), 1);
    }

    #[test]
    fn test_invoke_requires_both_clips() {
        let plugin = plugin().unwrap();
        let mut args = ArgMap::new();
        args.set_node("clip", gray(4, 1, 0));
        assert!(matches!(
            plugin.invoke("AdaptiveBinarize", &args),
            Err(PluginError::MissingArgument { .. })
        ));
    }
}
