use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use plessey_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Trait for image data types the detector accepts as input.
///
/// Every supported type converts into `f32`, which is the single internal
/// representation used by the filters.
pub trait ImageDtype: Copy + Into<f32> + Send + Sync {}

impl ImageDtype for f32 {}

impl ImageDtype for u8 {}

impl ImageDtype for u16 {}

/// Represents a single channel image with pixel data.
///
/// The pixels are stored contiguously in row-major order, so the pixel at
/// column `x` and row `y` lives at index `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    data: Vec<T>,
}

/// A floating point image, the working type of every filter stage.
pub type ScalarField = Image<f32>;

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image in row-major order.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the dimensions is zero or the length of the
    /// pixel data does not match the image size.
    ///
    /// # Examples
    ///
    /// ```
    /// use plessey_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::EmptyImage(size.width, size.height));
        }

        if data.len() != size.area() {
            return Err(ImageError::InvalidDataLength(data.len(), size.area()));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and constant pixel value.
    ///
    /// # Examples
    ///
    /// ```
    /// use plessey_image::Image;
    ///
    /// let image = Image::<f32>::from_size_val([4, 3].into(), 1.5).unwrap();
    ///
    /// assert_eq!(image.width(), 4);
    /// assert_eq!(image.height(), 3);
    /// assert_eq!(image.get(3, 2), Some(&1.5));
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.area()])
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the pixel data as a row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get a reference to the pixel at column `x` and row `y`.
    ///
    /// Returns `None` when the coordinates fall outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.data.get(y * self.size.width + x)
    }

    /// Get a mutable reference to the pixel at column `x` and row `y`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.data.get_mut(y * self.size.width + x)
    }

    /// Get the pixel value at column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates fall outside the image.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        self.get(x, y).copied().ok_or(ImageError::PixelIndexOutOfBounds(
            x,
            y,
            self.size.width,
            self.size.height,
        ))
    }

    /// Set the pixel value at column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates fall outside the image.
    pub fn set_pixel(&mut self, x: usize, y: usize, val: T) -> Result<(), ImageError> {
        let (width, height) = (self.size.width, self.size.height);
        let pixel = self
            .get_mut(x, y)
            .ok_or(ImageError::PixelIndexOutOfBounds(x, y, width, height))?;
        *pixel = val;
        Ok(())
    }

    /// Cast the pixel data of the image to a different type.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in the target type.
    pub fn cast<U>(&self) -> Result<Image<U>, ImageError>
    where
        U: num_traits::NumCast,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| U::from(x).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, casted_data)
    }
}

impl<T: ImageDtype> Image<T> {
    /// Convert the image into the floating point working representation.
    ///
    /// This is infallible for every [`ImageDtype`].
    pub fn to_scalar_field(&self) -> ScalarField {
        Image {
            size: self.size,
            data: self.data.iter().map(|&x| x.into()).collect(),
        }
    }
}
