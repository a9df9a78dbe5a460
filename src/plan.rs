//! The synchronous half of a render call.
//!
//! [`ImagePlan::new`] resolves everything that does not need a view tree or a
//! decoded bitmap: background color, decoder request, size constraints and
//! layout. Equal inputs give equal plans, so a plan can be computed, compared
//! and cached independently of rendering.
//!
//! # Example
//!
//! ```
//! use cardimage::{DisplayMetrics, HostConfig, ImagePlan, ImageSize, ImageSpec};
//!
//! let mut spec = ImageSpec::new("avatar.png");
//! spec.size = ImageSize::Small;
//!
//! let plan = ImagePlan::new(&spec, &HostConfig::default(), &DisplayMetrics::default(), false);
//! assert_eq!(plan.decode.size_hint, 40);
//! assert_eq!(plan.constraints.max_width, Some(40));
//! assert!(plan.wrapper_params.is_none());
//! ```

use crate::card::ImageSpec;
use crate::color::{Argb, parse_background_color};
use crate::config::{DisplayMetrics, HostConfig};
use crate::constraint::{SizeConstraints, size_limit};
use crate::layout::{ImageLayout, LayoutParams, build_layout};
use crate::loader::DecodeRequest;

/// Everything a render call decides before touching the view tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImagePlan {
    /// Parsed background color; also the avatar fill for `Person` images.
    pub background: Argb,
    /// Background for the image view itself. `None` when the style draws
    /// its own.
    pub view_background: Option<Argb>,
    /// What the loader is asked to decode.
    pub decode: DecodeRequest,
    pub constraints: SizeConstraints,
    pub layout: ImageLayout,
    /// Params for the image view.
    pub image_params: LayoutParams,
    /// Params for the stretch wrapper, when one is needed.
    pub wrapper_params: Option<LayoutParams>,
}

impl ImagePlan {
    pub fn new(
        spec: &ImageSpec,
        host: &HostConfig,
        metrics: &DisplayMetrics,
        in_collection: bool,
    ) -> Self {
        let background = parse_background_color(spec.background_color.as_deref());
        let view_background = (!spec.style.suppresses_view_background()).then_some(background);

        let decode = DecodeRequest {
            url: spec.url.clone(),
            base_url: host.image_base_url.clone(),
            size_hint: size_limit(spec.size, &host.image_sizes, metrics),
        };

        let constraints = SizeConstraints::resolve(spec, &host.image_sizes, metrics);
        let layout = build_layout(
            spec.size,
            spec.height,
            spec.horizontal_alignment,
            in_collection,
        );
        let (image_params, wrapper_params) = layout.split(constraints.fixed);

        Self {
            background,
            view_background,
            decode,
            constraints,
            layout,
            image_params,
            wrapper_params,
        }
    }
}
